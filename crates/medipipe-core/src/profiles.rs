//! Codec and output profiles.
//!
//! The supported source codecs form a closed set: each maps to a fixed pair
//! of GStreamer parse/decode elements. Unknown codec names are rejected when
//! the configuration is built, not when a file is dispatched.

use std::fmt;
use std::str::FromStr;

/// Source video codec of the recordings being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    Mpeg4,
    H264,
    H265,
}

impl VideoCodec {
    /// Demux element shared by all supported codecs (MP4 container).
    pub const DEMUX_ELEMENT: &'static str = "qtdemux";

    /// GStreamer parse element for this codec.
    pub fn parse_element(&self) -> &'static str {
        match self {
            VideoCodec::Mpeg4 => "mpeg4videoparse",
            VideoCodec::H264 => "h264parse",
            VideoCodec::H265 => "h265parse",
        }
    }

    /// Hardware decode element for this codec.
    pub fn decode_element(&self) -> &'static str {
        match self {
            VideoCodec::Mpeg4 => "omxmpeg4videodec",
            VideoCodec::H264 => "omxh264dec",
            VideoCodec::H265 => "omxh265dec",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::Mpeg4 => "mpeg4",
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a codec name is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown video codec '{0}' (expected one of: mpeg4, h264, h265)")]
pub struct UnknownCodec(pub String);

impl FromStr for VideoCodec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpeg4" => Ok(VideoCodec::Mpeg4),
            "h264" => Ok(VideoCodec::H264),
            "h265" => Ok(VideoCodec::H265),
            other => Err(UnknownCodec(other.to_string())),
        }
    }
}

/// Numeric encoding targets for the transcoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputProfile {
    pub width: u32,
    pub height: u32,
    /// Target bitrate in bits per second.
    pub bitrate: u32,
}

impl Default for OutputProfile {
    fn default() -> Self {
        OutputProfile {
            width: 320,
            height: 240,
            bitrate: 30_000,
        }
    }
}
