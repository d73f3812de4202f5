use std::fmt;

use crate::error::{OscError, OscResult};

/// NTP-format time tag carried by bundles.
///
/// The upper 32 bits are seconds since 1900, the lower 32 bits a binary
/// fraction of a second. TUIO trackers almost always send [`OscTimeTag::IMMEDIATELY`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OscTimeTag(pub u64);

impl OscTimeTag {
    pub const IMMEDIATELY: OscTimeTag = OscTimeTag(1);

    pub fn new(seconds: u32, fraction: u32) -> Self {
        Self((u64::from(seconds) << 32) | u64::from(fraction))
    }

    pub fn seconds(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn fraction(&self) -> u32 {
        self.0 as u32
    }

    pub fn is_immediate(&self) -> bool {
        *self == Self::IMMEDIATELY
    }
}

impl fmt::Debug for OscTimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_immediate() {
            write!(f, "OscTimeTag(immediately)")
        } else {
            write!(f, "OscTimeTag({}.{:08x})", self.seconds(), self.fraction())
        }
    }
}

/// A single typed OSC argument.
#[derive(Clone, Debug, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    TimeTag(OscTimeTag),
    True,
    False,
    Nil,
    Infinitum,
}

impl OscArg {
    /// The OSC type tag character for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            Self::Int(_) => 'i',
            Self::Float(_) => 'f',
            Self::String(_) => 's',
            Self::Blob(_) => 'b',
            Self::Long(_) => 'h',
            Self::Double(_) => 'd',
            Self::TimeTag(_) => 't',
            Self::True => 'T',
            Self::False => 'F',
            Self::Nil => 'N',
            Self::Infinitum => 'I',
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int32",
            Self::Float(_) => "float32",
            Self::String(_) => "string",
            Self::Blob(_) => "blob",
            Self::Long(_) => "int64",
            Self::Double(_) => "float64",
            Self::TimeTag(_) => "timetag",
            Self::True => "true",
            Self::False => "false",
            Self::Nil => "nil",
            Self::Infinitum => "infinitum",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for OscArg {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// An OSC message: an address followed by typed arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// The leading string argument. TUIO puts its command name here.
    pub fn command(&self) -> Option<&str> {
        self.args.first().and_then(OscArg::as_str)
    }

    fn arg(&self, index: usize) -> OscResult<&OscArg> {
        self.args
            .get(index)
            .ok_or(OscError::MissingArgument { index })
    }

    /// Read argument `index` as an int32.
    pub fn arg_i32(&self, index: usize) -> OscResult<i32> {
        match self.arg(index)? {
            OscArg::Int(v) => Ok(*v),
            other => Err(OscError::ArgumentType {
                index,
                expected: "int32",
                found: other.type_name(),
            }),
        }
    }

    /// Read argument `index` as a float32.
    pub fn arg_f32(&self, index: usize) -> OscResult<f32> {
        match self.arg(index)? {
            OscArg::Float(v) => Ok(*v),
            other => Err(OscError::ArgumentType {
                index,
                expected: "float32",
                found: other.type_name(),
            }),
        }
    }

    /// The type tag string as it appears on the wire, including the comma.
    pub fn type_tags(&self) -> String {
        std::iter::once(',')
            .chain(self.args.iter().map(OscArg::type_tag))
            .collect()
    }
}

/// A bundle of packets sharing one time tag.
#[derive(Clone, Debug, PartialEq)]
pub struct OscBundle {
    pub time_tag: OscTimeTag,
    pub content: Vec<OscPacket>,
}

impl OscBundle {
    /// A bundle of messages to be applied immediately.
    pub fn immediate(messages: Vec<OscMessage>) -> Self {
        Self {
            time_tag: OscTimeTag::IMMEDIATELY,
            content: messages.into_iter().map(OscPacket::Message).collect(),
        }
    }
}

/// Top-level unit of one datagram.
#[derive(Clone, Debug, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl OscPacket {
    pub fn is_bundle(&self) -> bool {
        matches!(self, Self::Bundle(_))
    }

    /// All messages in transport order.
    ///
    /// Nested bundles are flattened depth-first, preserving element order.
    pub fn messages(&self) -> Vec<&OscMessage> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages<'a>(&'a self, out: &mut Vec<&'a OscMessage>) {
        match self {
            Self::Message(msg) => out.push(msg),
            Self::Bundle(bundle) => {
                for packet in &bundle.content {
                    packet.collect_messages(out);
                }
            }
        }
    }
}

impl From<OscMessage> for OscPacket {
    fn from(msg: OscMessage) -> Self {
        Self::Message(msg)
    }
}

impl From<OscBundle> for OscPacket {
    fn from(bundle: OscBundle) -> Self {
        Self::Bundle(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(address: &str, args: Vec<OscArg>) -> OscMessage {
        OscMessage::new(address, args)
    }

    #[test]
    fn time_tag_parts() {
        let tag = OscTimeTag::new(3, 0x8000_0000);
        assert_eq!(tag.seconds(), 3);
        assert_eq!(tag.fraction(), 0x8000_0000);
        assert!(!tag.is_immediate());
        assert!(OscTimeTag::IMMEDIATELY.is_immediate());
    }

    #[test]
    fn command_is_first_string_arg() {
        let m = msg("/tuio/2Dobj", vec!["alive".into(), 1.into()]);
        assert_eq!(m.command(), Some("alive"));
        let m = msg("/tuio/2Dobj", vec![1.into()]);
        assert_eq!(m.command(), None);
        let m = msg("/tuio/2Dobj", vec![]);
        assert_eq!(m.command(), None);
    }

    #[test]
    fn typed_accessors_report_mismatch() {
        let m = msg("/x", vec!["set".into(), 5.into(), 0.5f32.into()]);
        assert_eq!(m.arg_i32(1).unwrap(), 5);
        assert_eq!(m.arg_f32(2).unwrap(), 0.5);
        assert_eq!(
            m.arg_i32(2).unwrap_err(),
            OscError::ArgumentType {
                index: 2,
                expected: "int32",
                found: "float32"
            }
        );
        assert_eq!(m.arg_f32(3).unwrap_err(), OscError::MissingArgument { index: 3 });
    }

    #[test]
    fn type_tags_string() {
        let m = msg("/x", vec!["s".into(), 1.into(), 2.0f32.into(), OscArg::True]);
        assert_eq!(m.type_tags(), ",sifT");
    }

    #[test]
    fn nested_bundles_flatten_in_order() {
        let inner = OscBundle::immediate(vec![msg("/b", vec![]), msg("/c", vec![])]);
        let outer = OscBundle {
            time_tag: OscTimeTag::IMMEDIATELY,
            content: vec![
                msg("/a", vec![]).into(),
                inner.into(),
                msg("/d", vec![]).into(),
            ],
        };
        let packet = OscPacket::from(outer);
        let addresses: Vec<&str> = packet.messages().iter().map(|m| m.address.as_str()).collect();
        assert_eq!(addresses, vec!["/a", "/b", "/c", "/d"]);
        assert!(packet.is_bundle());
    }
}
