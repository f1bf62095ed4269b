//! Draw relay routing.
//!
//! Strokes are forwarded verbatim; the relay only decides who gets them.

use scribble_protocol::{ParticipantId, Recipient, Stroke};

/// Picks the recipients of a stroke sent by `sender`.
///
/// `drawer` is the drawer of the running turn, or `None` when no turn is
/// running. Returns `None` when the stroke must be dropped because the
/// sender isn't that drawer.
///
/// Pen events go to everyone but the drawer, who already has them locally.
/// A clear goes to the whole room so every canvas resets together.
pub fn route(stroke: &Stroke, sender: ParticipantId, drawer: Option<ParticipantId>) -> Option<Recipient> {
    let drawer = drawer.filter(|d| *d == sender)?;
    Some(match stroke {
        Stroke::Clear => Recipient::All,
        Stroke::Start(_) | Stroke::Point(_) | Stroke::End => Recipient::AllExcept(drawer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribble_protocol::StrokePoint;

    fn pid(id: u64) -> ParticipantId {
        ParticipantId(id)
    }

    fn point() -> Stroke {
        Stroke::Point(StrokePoint { x: 10.0, y: 20.0, color: "#000000".into() })
    }

    #[test]
    fn test_route_drawer_point_excludes_drawer() {
        assert_eq!(route(&point(), pid(1), Some(pid(1))), Some(Recipient::AllExcept(pid(1))));
        assert_eq!(route(&Stroke::End, pid(1), Some(pid(1))), Some(Recipient::AllExcept(pid(1))));
    }

    #[test]
    fn test_route_clear_reaches_everyone() {
        assert_eq!(route(&Stroke::Clear, pid(1), Some(pid(1))), Some(Recipient::All));
    }

    #[test]
    fn test_route_non_drawer_is_dropped() {
        assert_eq!(route(&point(), pid(2), Some(pid(1))), None);
        assert_eq!(route(&Stroke::Clear, pid(2), Some(pid(1))), None);
    }

    #[test]
    fn test_route_without_turn_is_dropped() {
        assert_eq!(route(&point(), pid(1), None), None);
    }
}
