// src/chart/channel.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which metric is mapped to the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectedChannel {
    Saturation,
    Chroma,
    Hue,
    ChannelA,
    ChannelB,
    #[default]
    Luminance,
}

impl SelectedChannel {
    /// The choices offered by the channel selector, in menu order.
    pub const MENU: [SelectedChannel; 5] = [
        SelectedChannel::Chroma,
        SelectedChannel::Hue,
        SelectedChannel::Luminance,
        SelectedChannel::ChannelA,
        SelectedChannel::ChannelB,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SelectedChannel::Saturation => "Saturation",
            SelectedChannel::Chroma => "Chroma",
            SelectedChannel::Hue => "Hue",
            SelectedChannel::ChannelA => "A-Channel",
            SelectedChannel::ChannelB => "B-Channel",
            SelectedChannel::Luminance => "Luminance",
        }
    }

    /// Never fails: anything unrecognised plots luminance.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "saturation" | "sat" => SelectedChannel::Saturation,
            "chroma" => SelectedChannel::Chroma,
            "hue" => SelectedChannel::Hue,
            "a-channel" | "channela" | "channel_a" | "a" => SelectedChannel::ChannelA,
            "b-channel" | "channelb" | "channel_b" | "b" => SelectedChannel::ChannelB,
            _ => SelectedChannel::Luminance,
        }
    }
}

impl fmt::Display for SelectedChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for SelectedChannel {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<SelectedChannel> for String {
    fn from(channel: SelectedChannel) -> Self {
        channel.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for channel in [
            SelectedChannel::Saturation,
            SelectedChannel::Chroma,
            SelectedChannel::Hue,
            SelectedChannel::ChannelA,
            SelectedChannel::ChannelB,
            SelectedChannel::Luminance,
        ] {
            assert_eq!(SelectedChannel::from_label(channel.label()), channel);
        }
    }

    #[test]
    fn test_unknown_label_falls_back_to_luminance() {
        assert_eq!(SelectedChannel::from_label("nonsense"), SelectedChannel::Luminance);
        assert_eq!(SelectedChannel::from_label(""), SelectedChannel::Luminance);
        assert_eq!(SelectedChannel::default(), SelectedChannel::Luminance);
    }

    #[test]
    fn test_menu_offers_five_choices_without_saturation() {
        assert_eq!(SelectedChannel::MENU.len(), 5);
        assert!(!SelectedChannel::MENU.contains(&SelectedChannel::Saturation));
    }

    #[test]
    fn test_deserializes_from_label() {
        let channel: SelectedChannel = serde_yaml::from_str("A-Channel").unwrap();
        assert_eq!(channel, SelectedChannel::ChannelA);
    }
}
