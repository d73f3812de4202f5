use bytes::{Buf, BufMut, BytesMut};

use crate::error::{OscError, OscResult};
use crate::message::{OscArg, OscBundle, OscMessage, OscPacket, OscTimeTag};

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_PACKET_SIZE: usize = 65_507;

/// Bundles nested deeper than this are rejected.
pub const MAX_BUNDLE_DEPTH: usize = 16;

const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Codec for OSC 1.0 packets.
///
/// Wire layout:
/// ```text
/// message: [address: padded string][type tags: padded string ",..."][args...]
/// bundle:  ["#bundle\0"][time tag: u64][(size: i32, element: packet)...]
/// ```
/// Strings are NUL-terminated and padded to a multiple of four bytes. All
/// numeric values are big-endian.
pub struct OscCodec;

impl OscCodec {
    /// Decode one datagram into a packet.
    pub fn decode(data: &[u8]) -> OscResult<OscPacket> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(OscError::PacketTooLarge {
                size: data.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        decode_packet(data, 0)
    }

    /// Encode a packet into a datagram payload.
    pub fn encode(packet: &OscPacket) -> OscResult<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(256);
        encode_packet(packet, &mut buf, 0)?;
        if buf.len() > MAX_PACKET_SIZE {
            return Err(OscError::PacketTooLarge {
                size: buf.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        Ok(buf.to_vec())
    }

    /// Encode a single message without a bundle wrapper.
    pub fn encode_message(msg: &OscMessage) -> OscResult<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(64);
        encode_message(msg, &mut buf)?;
        Ok(buf.to_vec())
    }
}

/// Number of bytes `len` occupies once padded to a 4-byte boundary.
fn padded(len: usize) -> usize {
    (len + 3) & !3
}

fn take<'a>(buf: &mut &'a [u8], n: usize, context: &'static str) -> OscResult<&'a [u8]> {
    if buf.len() < n {
        return Err(OscError::Truncated {
            context,
            needed: n,
            available: buf.len(),
        });
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

fn read_i32(buf: &mut &[u8], context: &'static str) -> OscResult<i32> {
    let mut head = take(buf, 4, context)?;
    Ok(head.get_i32())
}

fn read_u64(buf: &mut &[u8], context: &'static str) -> OscResult<u64> {
    let mut head = take(buf, 8, context)?;
    Ok(head.get_u64())
}

fn read_string(buf: &mut &[u8], context: &'static str) -> OscResult<String> {
    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(OscError::UnterminatedString(context))?;
    let raw = take(buf, padded(nul + 1), context)?;
    std::str::from_utf8(&raw[..nul])
        .map(str::to_owned)
        .map_err(|_| OscError::InvalidUtf8(context))
}

fn read_blob(buf: &mut &[u8]) -> OscResult<Vec<u8>> {
    let size = read_i32(buf, "blob size")?;
    if size < 0 {
        return Err(OscError::InvalidBlobSize(size));
    }
    let size = size as usize;
    let raw = take(buf, padded(size), "blob")?;
    Ok(raw[..size].to_vec())
}

fn decode_packet(data: &[u8], depth: usize) -> OscResult<OscPacket> {
    if data.starts_with(BUNDLE_TAG) {
        decode_bundle(data, depth).map(OscPacket::Bundle)
    } else {
        decode_message(data).map(OscPacket::Message)
    }
}

fn decode_bundle(data: &[u8], depth: usize) -> OscResult<OscBundle> {
    if depth >= MAX_BUNDLE_DEPTH {
        return Err(OscError::NestingTooDeep(MAX_BUNDLE_DEPTH));
    }
    let mut buf = data;
    take(&mut buf, BUNDLE_TAG.len(), "bundle tag")?;
    let time_tag = OscTimeTag(read_u64(&mut buf, "bundle time tag")?);

    let mut content = Vec::new();
    while !buf.is_empty() {
        let size = read_i32(&mut buf, "bundle element size")?;
        if size <= 0 || size as usize > buf.len() {
            return Err(OscError::InvalidElementSize {
                size,
                remaining: buf.len(),
            });
        }
        let element = take(&mut buf, size as usize, "bundle element")?;
        content.push(decode_packet(element, depth + 1)?);
    }
    Ok(OscBundle { time_tag, content })
}

fn decode_message(data: &[u8]) -> OscResult<OscMessage> {
    let mut buf = data;
    let address = read_string(&mut buf, "address")?;
    if !address.starts_with('/') {
        return Err(OscError::InvalidAddress(address));
    }

    // Some very old senders omit the type tag string entirely.
    if buf.is_empty() {
        return Ok(OscMessage::new(address, Vec::new()));
    }

    let tags = read_string(&mut buf, "type tags")?;
    let mut tags = tags.chars();
    if tags.next() != Some(',') {
        return Err(OscError::MissingTypeTags);
    }

    let mut args = Vec::with_capacity(tags.as_str().len());
    for tag in tags {
        let arg = match tag {
            'i' => OscArg::Int(read_i32(&mut buf, "int32 argument")?),
            'f' => {
                let mut head = take(&mut buf, 4, "float32 argument")?;
                OscArg::Float(head.get_f32())
            }
            's' | 'S' => OscArg::String(read_string(&mut buf, "string argument")?),
            'b' => OscArg::Blob(read_blob(&mut buf)?),
            'h' => {
                let mut head = take(&mut buf, 8, "int64 argument")?;
                OscArg::Long(head.get_i64())
            }
            'd' => {
                let mut head = take(&mut buf, 8, "float64 argument")?;
                OscArg::Double(head.get_f64())
            }
            't' => OscArg::TimeTag(OscTimeTag(read_u64(&mut buf, "timetag argument")?)),
            'T' => OscArg::True,
            'F' => OscArg::False,
            'N' => OscArg::Nil,
            'I' => OscArg::Infinitum,
            other => return Err(OscError::UnsupportedTypeTag(other)),
        };
        args.push(arg);
    }
    Ok(OscMessage::new(address, args))
}

fn write_string(s: &str, buf: &mut BytesMut) -> OscResult<()> {
    if s.as_bytes().contains(&0) {
        return Err(OscError::InteriorNul);
    }
    buf.put_slice(s.as_bytes());
    buf.put_bytes(0, padded(s.len() + 1) - s.len());
    Ok(())
}

fn encode_packet(packet: &OscPacket, buf: &mut BytesMut, depth: usize) -> OscResult<()> {
    match packet {
        OscPacket::Message(msg) => encode_message(msg, buf),
        OscPacket::Bundle(bundle) => {
            if depth >= MAX_BUNDLE_DEPTH {
                return Err(OscError::NestingTooDeep(MAX_BUNDLE_DEPTH));
            }
            buf.put_slice(BUNDLE_TAG);
            buf.put_u64(bundle.time_tag.0);
            for element in &bundle.content {
                let mut inner = BytesMut::new();
                encode_packet(element, &mut inner, depth + 1)?;
                buf.put_i32(inner.len() as i32);
                buf.put_slice(&inner);
            }
            Ok(())
        }
    }
}

fn encode_message(msg: &OscMessage, buf: &mut BytesMut) -> OscResult<()> {
    if !msg.address.starts_with('/') {
        return Err(OscError::InvalidAddress(msg.address.clone()));
    }
    write_string(&msg.address, buf)?;
    write_string(&msg.type_tags(), buf)?;
    for arg in &msg.args {
        match arg {
            OscArg::Int(v) => buf.put_i32(*v),
            OscArg::Float(v) => buf.put_f32(*v),
            OscArg::String(s) => write_string(s, buf)?,
            OscArg::Blob(data) => {
                buf.put_i32(data.len() as i32);
                buf.put_slice(data);
                buf.put_bytes(0, padded(data.len()) - data.len());
            }
            OscArg::Long(v) => buf.put_i64(*v),
            OscArg::Double(v) => buf.put_f64(*v),
            OscArg::TimeTag(t) => buf.put_u64(t.0),
            OscArg::True | OscArg::False | OscArg::Nil | OscArg::Infinitum => {}
        }
    }
    Ok(())
}
