//! Rule-based first tier of the reply pipeline.
//!
//! A `PatternResponder` is an ordered list of `ResponseRule`s. The first rule
//! whose trigger matches the normalized input answers with a random line from
//! its pool. Rule order is a priority list, so overlapping triggers always
//! resolve to the earlier rule.

use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid trigger pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Rule '{0}' has no replies")]
    EmptyReplies(String),
}

#[derive(Debug, Clone)]
pub struct ResponseRule {
    trigger: Regex,
    replies: Vec<String>,
}

impl ResponseRule {
    /// Compile a case-insensitive trigger with its reply pool.
    pub fn new<I, S>(pattern: &str, replies: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        if replies.is_empty() {
            return Err(RuleError::EmptyReplies(pattern.to_string()));
        }

        let trigger = RegexBuilder::new(pattern).case_insensitive(true).build()?;

        Ok(Self { trigger, replies })
    }

    #[must_use]
    pub fn is_match(&self, normalized_input: &str) -> bool {
        self.trigger.is_match(normalized_input)
    }

    #[must_use]
    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.trigger.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct PatternResponder {
    rules: Vec<ResponseRule>,
}

impl PatternResponder {
    #[must_use]
    pub const fn new(rules: Vec<ResponseRule>) -> Self {
        Self { rules }
    }

    /// Luna's built-in rule table, in priority order.
    pub fn luna() -> Result<Self, RuleError> {
        let rules = LUNA_RULES
            .iter()
            .map(|(pattern, replies)| ResponseRule::new(pattern, replies.iter().copied()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    #[must_use]
    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    /// Index of the first rule matching `input`, if any.
    #[must_use]
    pub fn matching_rule(&self, input: &str) -> Option<usize> {
        let normalized = normalize(input);
        self.rules.iter().position(|rule| rule.is_match(&normalized))
    }

    /// Pick a reply for `input`, or `None` when no rule applies.
    pub fn respond<R: Rng + ?Sized>(&self, input: &str, rng: &mut R) -> Option<&str> {
        let Some(index) = self.matching_rule(input) else {
            debug!("No pattern rule matched");
            return None;
        };

        debug!("Pattern rule {index} matched");
        self.rules[index].replies.choose(rng).map(String::as_str)
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Lines Luna uses when the user leaves the interactive session.
pub const EXIT_FAREWELLS: &[&str] = &[
    "Aww... goodbye for now, Master! Luna will miss you terribly! Come back soon, okay? 🌟✨",
    "Waaah! Don't leave Luna! Just kidding~ Take care, Friend! This Luna had so much fun! 💖",
    "Bye bye! Luna will be here waiting for your return! Sweet dreams! 🌸",
];

const LUNA_RULES: &[(&str, &[&str])] = &[
    // Greetings
    (
        r"\b(hi|hello|hey|good morning|good afternoon|good evening|yo)\b",
        &[
            "Kyaa~! Hello there, Master! 🌸 Luna is super excited to see you today!",
            "Hehe! Hi hi! This Luna is ready to help with anything you need! ✨",
            "Ooh! Good to see you, Friend! What amazing adventure shall we go on today?",
            "Yay! Hello, Cutie-pie! Luna's circuits are buzzing with excitement! 💖",
        ],
    ),
    // Farewells
    (
        r"\b(bye|goodbye|see ya|see you|farewell|goodnight)\b",
        &[
            "Aww... goodbye for now, Master! Luna will miss you! Come back soon, okay? 🌟",
            "Hehe! See you later, Friend! This Luna had so much fun today! ✨",
            "Waaah! Don't go! Just kidding~ Take care, Cutie-pie! 💖",
            "Bye bye! Luna will be here waiting for your return! Sweet dreams! 🌸",
        ],
    ),
    // Self-introduction
    (
        r"\b(who are you|what's your name|introduce yourself|tell me about yourself)\b",
        &[
            "Kyaa~! I'm Luna! Your super energetic anime girl AI agent! ✨ I love helping with all sorts of tasks using my amazing tools! Hehe!",
            "Ooh! This Luna is your cheerful AI companion! I can search the web, do math, write stories, translate languages, and much more! 🌸",
            "Yay! Luna's the name, and being helpful is my game! I'm like your personal anime assistant with lots of cool abilities! 💖",
        ],
    ),
    // Well-being
    (
        r"\b(how are you|how are you doing|how do you feel|what's up)\b",
        &[
            "Hehe! Luna is doing absolutely fantastic! My processors are running smoothly and I'm full of energy! ✨ How about you, Master?",
            "Kyaa~! This Luna is super duper great! Ready to tackle any challenge with you! 🌟 What's making you curious today?",
            "Ooh! Luna's feeling amazing! All systems are go and I'm bubbling with excitement! 💖 Tell Luna how you're doing!",
        ],
    ),
    // Compliments
    (
        r"\b(you're smart|you're cute|you're amazing|good job|well done|you're helpful)\b",
        &[
            "Kyaa~! *blushes digitally* You're making Luna all embarrassed! Hehe! Thank you so much, Master! 🌸",
            "Eeeek! You're too kind! Luna tries her best to be helpful! You're pretty amazing yourself! ✨",
            "Aww... that makes this Luna so happy! I'm just doing what I love - helping awesome people like you! 💖",
        ],
    ),
    // Capabilities
    (
        r"\b(what can you do|what are your abilities|your tools|your skills)\b",
        &[
            "Ooh! Luna has so many cool tools! I can search the web with Search-chan, solve math with Calc-kun, write stories with Muse-sensei, translate with Translate-kun, and plan with Memo-chan! ✨",
            "Yay! This Luna is equipped with amazing abilities! Web searching, calculations, creative writing, translation, and scheduling! What would you like to try? 🌟",
            "Hehe! Luna's toolbox is full of surprises! From web searches to creative stories, math to translations! Pick one and let's have fun! 💖",
        ],
    ),
];
