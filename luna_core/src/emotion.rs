//! Keyword-driven emotion inference for Luna's replies.
//!
//! The classifier scans the lower-cased reply for a handful of interjections
//! and emoji. Groups are checked in order and the first hit decides the tag.
//! One group ("positive") resolves to a random tag out of a small set, so the
//! caller passes in the random generator.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTag {
    Idle,
    Speaking,
    Happy,
    Excited,
    Mischievous,
    Curious,
    Sad,
    Confused,
    Thinking,
    Energetic,
}

impl EmotionTag {
    pub const ALL: [Self; 10] = [
        Self::Idle,
        Self::Speaking,
        Self::Happy,
        Self::Excited,
        Self::Mischievous,
        Self::Curious,
        Self::Sad,
        Self::Confused,
        Self::Thinking,
        Self::Energetic,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Speaking => "speaking",
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Mischievous => "mischievous",
            Self::Curious => "curious",
            Self::Sad => "sad",
            Self::Confused => "confused",
            Self::Thinking => "thinking",
            Self::Energetic => "energetic",
        }
    }

    /// Avatar image shown while Luna is in this state.
    ///
    /// `energetic` has no artwork of its own and reuses the excited pose.
    #[must_use]
    pub const fn avatar_image(self) -> &'static str {
        match self {
            Self::Idle => "luna_idle.jpg",
            Self::Speaking => "luna_speaking.jpg",
            Self::Happy => "luna_happy.jpg",
            Self::Excited | Self::Energetic => "luna_excited.jpg",
            Self::Mischievous => "luna_mischievous.jpg",
            Self::Curious => "luna_curious.jpg",
            Self::Sad => "luna_sad.jpg",
            Self::Confused => "luna_confused.jpg",
            Self::Thinking => "luna_thinking.jpg",
        }
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| format!("unknown emotion tag: {s}"))
    }
}

/// How a matched keyword group turns into a tag.
#[derive(Debug, Clone, Copy)]
pub enum Resolution {
    Fixed(EmotionTag),
    OneOf(&'static [EmotionTag]),
}

/// A keyword group and the tag it resolves to.
#[derive(Debug, Clone, Copy)]
pub struct EmotionGroup {
    pub keywords: &'static [&'static str],
    pub resolution: Resolution,
}

const POSITIVE_TAGS: &[EmotionTag] = &[
    EmotionTag::Happy,
    EmotionTag::Excited,
    EmotionTag::Energetic,
];

/// Checked top to bottom; first group with any keyword present wins.
pub const EMOTION_GROUPS: &[EmotionGroup] = &[
    EmotionGroup {
        keywords: &[
            "kyaa~!", "yay!", "excited!", "amazing!", "happy", "love", "✨", "🌸", "💖", "🌟",
        ],
        resolution: Resolution::OneOf(POSITIVE_TAGS),
    },
    EmotionGroup {
        keywords: &["hehe!", "mischievous", "teasing"],
        resolution: Resolution::Fixed(EmotionTag::Mischievous),
    },
    EmotionGroup {
        keywords: &["ooh!", "curious", "mystery"],
        resolution: Resolution::Fixed(EmotionTag::Curious),
    },
    EmotionGroup {
        keywords: &["aww...", "waaah!", "miss", "sorry"],
        resolution: Resolution::Fixed(EmotionTag::Sad),
    },
    EmotionGroup {
        keywords: &["eeeek!", "confused", "problem", "oops"],
        resolution: Resolution::Fixed(EmotionTag::Confused),
    },
];

#[derive(Debug, Clone, Copy)]
pub struct EmotionClassifier {
    groups: &'static [EmotionGroup],
    default_tag: EmotionTag,
}

impl EmotionClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: EMOTION_GROUPS,
            default_tag: EmotionTag::Speaking,
        }
    }

    /// Classify a reply. `rng` is only consulted when the matched group has
    /// more than one candidate tag.
    pub fn classify<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> EmotionTag {
        let lower = text.to_lowercase();

        let Some(group) = self
            .groups
            .iter()
            .find(|group| group.keywords.iter().any(|kw| lower.contains(kw)))
        else {
            return self.default_tag;
        };

        match group.resolution {
            Resolution::Fixed(tag) => tag,
            Resolution::OneOf(tags) => tags.choose(rng).copied().unwrap_or(self.default_tag),
        }
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn positive_group_resolves_to_cheerful_tags() {
        let classifier = EmotionClassifier::new();
        let tag = classifier.classify(
            "Kyaa~! Hello there, Master! 🌸 Luna is super excited to see you today!",
            &mut rng(),
        );
        assert!(POSITIVE_TAGS.contains(&tag));
    }

    #[test]
    fn groups_are_checked_in_order() {
        let classifier = EmotionClassifier::new();
        // "hehe!" and "sorry" both present: mischievous comes first.
        assert_eq!(
            classifier.classify("Hehe! Sorry, Master", &mut rng()),
            EmotionTag::Mischievous
        );
        // Emoji beats every later group.
        assert!(POSITIVE_TAGS.contains(&classifier.classify("Waaah! ✨", &mut rng())));
    }

    #[test]
    fn fixed_groups() {
        let classifier = EmotionClassifier::new();
        let mut r = rng();
        assert_eq!(classifier.classify("Ooh! A mystery", &mut r), EmotionTag::Curious);
        assert_eq!(
            classifier.classify("Waaah! My main brain isn't working right now! 😱", &mut r),
            EmotionTag::Sad
        );
        assert_eq!(
            classifier.classify("Eeeek! A tiny problem occurred!", &mut r),
            EmotionTag::Confused
        );
    }

    #[test]
    fn falls_back_to_speaking() {
        let classifier = EmotionClassifier::new();
        assert_eq!(
            classifier.classify("The answer is 4.", &mut rng()),
            EmotionTag::Speaking
        );
        assert_eq!(classifier.classify("", &mut rng()), EmotionTag::Speaking);
    }

    #[test]
    fn same_seed_same_tag() {
        let classifier = EmotionClassifier::new();
        for seed in 0..20 {
            let a = classifier.classify("Yay! love it", &mut StdRng::seed_from_u64(seed));
            let b = classifier.classify("Yay! love it", &mut StdRng::seed_from_u64(seed));
            assert_eq!(a, b);
            assert!(EmotionTag::ALL.contains(&a));
        }
    }

    #[test]
    fn random_pick_is_not_degenerate() {
        let classifier = EmotionClassifier::new();
        let mut r = rng();
        let seen: HashSet<EmotionTag> = (0..300)
            .map(|_| classifier.classify("Yay! That's amazing!", &mut r))
            .collect();
        assert_eq!(seen.len(), POSITIVE_TAGS.len());
    }

    #[test]
    fn tag_names_round_trip_through_display() {
        for tag in EmotionTag::ALL {
            assert_eq!(tag.to_string().parse::<EmotionTag>(), Ok(tag));
        }
        assert!("grumpy".parse::<EmotionTag>().is_err());
    }

    #[test]
    fn energetic_reuses_excited_avatar() {
        assert_eq!(
            EmotionTag::Energetic.avatar_image(),
            EmotionTag::Excited.avatar_image()
        );
        assert_eq!(EmotionTag::Thinking.avatar_image(), "luna_thinking.jpg");
    }
}
