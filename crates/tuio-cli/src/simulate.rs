//! Synthetic TUIO 1.1 object stream.

use std::f32::consts::TAU;

use tuio_client::{SetMessage, TuioMessage, OBJECT_2D_ADDRESS};
use tuio_osc::{OscBundle, OscMessage, OscPacket};
use tuio_types::{Motion, Position, SessionId, SymbolId};

/// Seconds for one full orbit.
const ORBIT_PERIOD: f32 = 8.0;
const ORBIT_RADIUS: f32 = 0.3;
const SOURCE_NAME: &str = "tuio-simulator";

/// Objects orbiting the centre of the surface at evenly spaced phases.
///
/// Session `n` carries symbol `n - 1`. Each frame is one bundle holding a
/// `source` message, `alive`, one `set` per object and `fseq`.
#[derive(Debug)]
pub struct OrbitSimulator {
    objects: usize,
    fps: u32,
    frame: i32,
}

impl OrbitSimulator {
    pub fn new(objects: usize, fps: u32) -> Self {
        Self {
            objects,
            fps: fps.max(1),
            frame: 0,
        }
    }

    /// Sequence number of the last generated frame.
    pub fn frame(&self) -> i32 {
        self.frame
    }

    /// Object states at the current frame.
    pub fn sets(&self) -> Vec<SetMessage> {
        let t = self.frame as f32 / self.fps as f32;
        let omega = TAU / ORBIT_PERIOD;
        (0..self.objects)
            .map(|i| {
                let phase = omega * t + TAU * i as f32 / self.objects as f32;
                let (sin, cos) = phase.sin_cos();
                SetMessage {
                    session_id: SessionId::new(i as i64 + 1),
                    symbol_id: SymbolId::new(i as i32),
                    position: Position::new(0.5 + ORBIT_RADIUS * cos, 0.5 + ORBIT_RADIUS * sin),
                    angle: phase.rem_euclid(TAU),
                    motion: Motion {
                        x_speed: -ORBIT_RADIUS * omega * sin,
                        y_speed: ORBIT_RADIUS * omega * cos,
                        rotation_speed: omega / TAU,
                        motion_accel: 0.0,
                        rotation_accel: 0.0,
                    },
                }
            })
            .collect()
    }

    /// Advance one frame and build its bundle.
    pub fn next_packet(&mut self) -> OscPacket {
        self.frame = self.frame.checked_add(1).unwrap_or(1);
        let sets = self.sets();

        let mut messages = Vec::with_capacity(sets.len() + 3);
        messages.push(OscMessage::new(OBJECT_2D_ADDRESS, vec!["source".into(), SOURCE_NAME.into()]));
        messages.push(TuioMessage::Alive(sets.iter().map(|s| s.session_id).collect()).to_osc());
        messages.extend(sets.into_iter().map(|s| TuioMessage::Set(s).to_osc()));
        messages.push(TuioMessage::Fseq(self.frame).to_osc());
        OscBundle::immediate(messages).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_client::TuioClient;
    use tuio_osc::OscCodec;

    #[test]
    fn bundle_layout() {
        let mut sim = OrbitSimulator::new(2, 30);
        let packet = sim.next_packet();
        let commands: Vec<&str> = packet.messages().into_iter().filter_map(|m| m.command()).collect();
        assert_eq!(commands, vec!["source", "alive", "set", "set", "fseq"]);
        assert_eq!(sim.frame(), 1);
    }

    #[test]
    fn objects_stay_on_the_surface() {
        let mut sim = OrbitSimulator::new(5, 60);
        for _ in 0..600 {
            sim.next_packet();
            for set in sim.sets() {
                assert!((0.0..=1.0).contains(&set.position.x));
                assert!((0.0..=1.0).contains(&set.position.y));
            }
        }
    }

    #[test]
    fn decoder_sees_every_object() {
        let mut sim = OrbitSimulator::new(4, 30);
        let client = TuioClient::new();
        for _ in 0..10 {
            let bytes = OscCodec::encode(&sim.next_packet()).unwrap();
            let packet = OscCodec::decode(&bytes).unwrap();
            let snapshot = client.process_packet(&packet);
            assert_eq!(snapshot.len(), 4);
        }
        assert_eq!(client.current_frame(), 10);
        assert_eq!(client.stats().messages_ignored, 10);
        assert_eq!(client.stats().messages_malformed, 0);
    }

    #[test]
    fn no_objects_is_an_empty_frame() {
        let mut sim = OrbitSimulator::new(0, 30);
        let client = TuioClient::new();
        assert!(client.process_packet(&sim.next_packet()).is_empty());
        assert_eq!(client.current_frame(), 1);
    }
}
