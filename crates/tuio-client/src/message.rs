use tuio_osc::{OscArg, OscMessage};
use tuio_types::{Motion, Position, SessionId, SymbolId};

use crate::error::{ClientError, ClientResult};

/// OSC address of the TUIO 1.1 2D object profile.
pub const OBJECT_2D_ADDRESS: &str = "/tuio/2Dobj";

/// Payload of a `set` message: the full state of one object.
#[derive(Clone, Debug, PartialEq)]
pub struct SetMessage {
    pub session_id: SessionId,
    pub symbol_id: SymbolId,
    pub position: Position,
    /// Orientation in radians.
    pub angle: f32,
    pub motion: Motion,
}

impl SetMessage {
    fn parse(msg: &OscMessage) -> ClientResult<Self> {
        let malformed = || ClientError::malformed("set");
        Ok(Self {
            session_id: SessionId::from(msg.arg_i32(1).map_err(malformed())?),
            symbol_id: SymbolId::new(msg.arg_i32(2).map_err(malformed())?),
            position: Position::new(
                msg.arg_f32(3).map_err(malformed())?,
                msg.arg_f32(4).map_err(malformed())?,
            ),
            angle: msg.arg_f32(5).map_err(malformed())?,
            motion: Motion {
                x_speed: msg.arg_f32(6).map_err(malformed())?,
                y_speed: msg.arg_f32(7).map_err(malformed())?,
                rotation_speed: msg.arg_f32(8).map_err(malformed())?,
                motion_accel: msg.arg_f32(9).map_err(malformed())?,
                rotation_accel: msg.arg_f32(10).map_err(malformed())?,
            },
        })
    }
}

/// A decoded message of the 2D object profile.
#[derive(Clone, Debug, PartialEq)]
pub enum TuioMessage {
    Set(SetMessage),
    /// Session ids the tracker claims are present in the current frame.
    Alive(Vec<SessionId>),
    /// Frame sequence number terminating the current frame.
    Fseq(i32),
}

impl TuioMessage {
    /// Parse one OSC message.
    ///
    /// Returns `Ok(None)` for other addresses and for commands this decoder
    /// does not handle (such as `source`). Returns an error only when a
    /// handled command carries the wrong arguments.
    pub fn parse(msg: &OscMessage) -> ClientResult<Option<Self>> {
        if msg.address != OBJECT_2D_ADDRESS {
            return Ok(None);
        }
        let parsed = match msg.command() {
            Some("set") => Self::Set(SetMessage::parse(msg)?),
            Some("alive") => {
                let ids = (1..msg.args.len())
                    .map(|i| msg.arg_i32(i).map(SessionId::from))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(ClientError::malformed("alive"))?;
                Self::Alive(ids)
            }
            Some("fseq") => Self::Fseq(msg.arg_i32(1).map_err(ClientError::malformed("fseq"))?),
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    /// The command name as it appears on the wire.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Alive(_) => "alive",
            Self::Fseq(_) => "fseq",
        }
    }

    /// Build the OSC message a tracker would send for this value.
    ///
    /// Session ids outside the int32 range are truncated, matching the wire
    /// width of the profile.
    pub fn to_osc(&self) -> OscMessage {
        let mut args: Vec<OscArg> = vec![self.command().into()];
        match self {
            Self::Set(set) => {
                args.push(OscArg::Int(set.session_id.get() as i32));
                args.push(OscArg::Int(set.symbol_id.get()));
                args.extend(
                    [
                        set.position.x,
                        set.position.y,
                        set.angle,
                        set.motion.x_speed,
                        set.motion.y_speed,
                        set.motion.rotation_speed,
                        set.motion.motion_accel,
                        set.motion.rotation_accel,
                    ]
                    .map(OscArg::Float),
                );
            }
            Self::Alive(ids) => {
                args.extend(ids.iter().map(|id| OscArg::Int(id.get() as i32)));
            }
            Self::Fseq(seq) => args.push(OscArg::Int(*seq)),
        }
        OscMessage::new(OBJECT_2D_ADDRESS, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_osc::OscError;

    fn set_args() -> Vec<OscArg> {
        vec![
            "set".into(),
            OscArg::Int(12),
            OscArg::Int(4),
            OscArg::Float(0.25),
            OscArg::Float(0.75),
            OscArg::Float(1.5),
            OscArg::Float(0.1),
            OscArg::Float(0.2),
            OscArg::Float(0.3),
            OscArg::Float(0.4),
            OscArg::Float(0.5),
        ]
    }

    #[test]
    fn parses_set() {
        let msg = OscMessage::new(OBJECT_2D_ADDRESS, set_args());
        let Some(TuioMessage::Set(set)) = TuioMessage::parse(&msg).unwrap() else {
            panic!("expected set");
        };
        assert_eq!(set.session_id, SessionId::new(12));
        assert_eq!(set.symbol_id, SymbolId::new(4));
        assert_eq!(set.position, Position::new(0.25, 0.75));
        assert_eq!(set.angle, 1.5);
        assert_eq!(set.motion.x_speed, 0.1);
        assert_eq!(set.motion.rotation_accel, 0.5);
    }

    #[test]
    fn parses_alive_with_and_without_ids() {
        let msg = OscMessage::new(OBJECT_2D_ADDRESS, vec!["alive".into(), 3.into(), 9.into()]);
        assert_eq!(
            TuioMessage::parse(&msg).unwrap(),
            Some(TuioMessage::Alive(vec![SessionId::new(3), SessionId::new(9)]))
        );
        let empty = OscMessage::new(OBJECT_2D_ADDRESS, vec!["alive".into()]);
        assert_eq!(TuioMessage::parse(&empty).unwrap(), Some(TuioMessage::Alive(vec![])));
    }

    #[test]
    fn parses_fseq() {
        let msg = OscMessage::new(OBJECT_2D_ADDRESS, vec!["fseq".into(), (-1).into()]);
        assert_eq!(TuioMessage::parse(&msg).unwrap(), Some(TuioMessage::Fseq(-1)));
    }

    #[test]
    fn other_addresses_are_ignored() {
        let msg = OscMessage::new("/tuio/2Dcur", vec!["fseq".into(), 1.into()]);
        assert_eq!(TuioMessage::parse(&msg).unwrap(), None);
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let source = OscMessage::new(OBJECT_2D_ADDRESS, vec!["source".into(), "t@h".into()]);
        assert_eq!(TuioMessage::parse(&source).unwrap(), None);
        let bare = OscMessage::new(OBJECT_2D_ADDRESS, vec![]);
        assert_eq!(TuioMessage::parse(&bare).unwrap(), None);
    }

    #[test]
    fn short_set_is_malformed() {
        let mut args = set_args();
        args.truncate(6);
        let msg = OscMessage::new(OBJECT_2D_ADDRESS, args);
        assert_eq!(
            TuioMessage::parse(&msg).unwrap_err(),
            ClientError::Malformed {
                command: "set",
                source: OscError::MissingArgument { index: 6 },
            }
        );
    }

    #[test]
    fn mistyped_alive_is_malformed() {
        let msg = OscMessage::new(OBJECT_2D_ADDRESS, vec!["alive".into(), 1.into(), 2.5f32.into()]);
        assert!(matches!(
            TuioMessage::parse(&msg),
            Err(ClientError::Malformed { command: "alive", .. })
        ));
    }

    #[test]
    fn to_osc_parses_back() {
        let msg = OscMessage::new(OBJECT_2D_ADDRESS, set_args());
        let parsed = TuioMessage::parse(&msg).unwrap().unwrap();
        assert_eq!(parsed.to_osc(), msg);
    }
}
