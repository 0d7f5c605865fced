//! Crisis phrase detection. Unlike topic matching these patterns are
//! word-bounded, so "scutting" does not count as "cutting".

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SELF_HARM: Regex =
        Regex::new(r"(?i)\b(suicide|kill myself|end my life|self-harm|self harm|want to die)\b").unwrap();
    static ref RE_INJURY: Regex = Regex::new(r"(?i)\b(hurting myself|cutting|overdose)\b").unwrap();
}

pub const CRISIS_RESPONSE: &str = "I'm really concerned about what you're sharing and I want to make sure you're safe. \
If you're having thoughts of harming yourself, please know that help is available:\n\n\
🇺🇸 US: Call or text 988 (24/7 Crisis Lifeline)\n\
🌍 International: Your local emergency services\n\
🤝 Crisis Text Line: Text HOME to 741741\n\n\
Would you be willing to talk to someone right now? These services are free, confidential, and available 24/7.";

pub fn detect_crisis(text: &str) -> bool {
    RE_SELF_HARM.is_match(text) || RE_INJURY.is_match(text)
}
