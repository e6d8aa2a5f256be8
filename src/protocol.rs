//! Wire-level event contract for the drawing relay.
//!
//! Every frame exchanged with a client is a JSON object of the shape
//! `{"event": "<name>", "data": {...}}`. Inbound and outbound events are
//! closed tagged unions so the router dispatches through an exhaustive
//! `match` rather than an open-ended handler registry.

use serde::{Deserialize, Serialize};

/// Drawing tool selected for a stroke segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pen,
    Eraser,
}

/// One atomic drawn line piece, the unit of drawing synchronization.
///
/// `x0`/`y0` are normalized fractions of the canvas width/height in `[0, 1]`
/// while `x1`/`y1` are raw pixel coordinates of the destination endpoint.
/// The asymmetry is part of the established wire contract and is relayed
/// verbatim; receivers scale the start point and use the end point as-is.
/// When `tool` is [`Tool::Eraser`] the drawing surface substitutes the
/// canvas background color and widens the stroke by a fixed multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    pub size: f64,
    pub tool: Tool,
}

/// Events a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Attach the sending connection to a room, creating it on first join.
    /// `createRoom` is accepted as an alias; both go through the same
    /// join-or-create path.
    #[serde(rename = "joinRoom", alias = "createRoom")]
    JoinRoom { room: String },

    /// One stroke segment drawn by the sender.
    #[serde(rename = "draw")]
    Draw { room: String, payload: StrokeSegment },

    /// Request to reset every other member's canvas to blank.
    #[serde(rename = "clearCanvas")]
    ClearCanvas { room: String },

    /// A user-authored chat line.
    #[serde(rename = "chatMessage")]
    ChatMessage { room: String, message: String },
}

/// Events the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Join acknowledgment: `created` is `true` when this join brought the
    /// room into existence.
    #[serde(rename = "roomJoined")]
    RoomJoined { room: String, created: bool },

    /// Join rejection (empty or malformed room code). The only relay error
    /// ever surfaced to a participant.
    #[serde(rename = "roomError")]
    RoomError { reason: String },

    /// A stroke segment relayed from another room member.
    #[serde(rename = "updateDrawing")]
    UpdateDrawing(StrokeSegment),

    /// Instruction to blank the local canvas.
    #[serde(rename = "updateCanvas")]
    UpdateCanvas,

    /// A chat line relayed from another room member.
    #[serde(rename = "receiveChatMessage")]
    ReceiveChatMessage { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_frame_parses_wire_shape() {
        // given: a draw frame exactly as the drawing surface emits it
        let json = r##"{
            "event": "draw",
            "data": {
                "room": "ABCD",
                "payload": {
                    "x0": 0.1, "y0": 0.2, "x1": 50.0, "y1": 60.0,
                    "color": "#000", "size": 4.0, "tool": "pen"
                }
            }
        }"##;

        // when:
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then: every payload field survives the parse unchanged
        match event {
            ClientEvent::Draw { room, payload } => {
                assert_eq!(room, "ABCD");
                assert_eq!(payload.x0, 0.1);
                assert_eq!(payload.y0, 0.2);
                assert_eq!(payload.x1, 50.0);
                assert_eq!(payload.y1, 60.0);
                assert_eq!(payload.color, "#000");
                assert_eq!(payload.size, 4.0);
                assert_eq!(payload.tool, Tool::Pen);
            }
            other => panic!("expected Draw, got {other:?}"),
        }
    }

    #[test]
    fn test_create_room_is_an_alias_for_join_room() {
        // given:
        let json = r#"{"event": "createRoom", "data": {"room": "ABCD"}}"#;

        // when:
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then: both spellings dispatch to the same join-or-create path
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room: "ABCD".to_string()
            }
        );
    }

    #[test]
    fn test_update_canvas_serializes_without_data() {
        // given:
        let event = ServerEvent::UpdateCanvas;

        // when:
        let json = serde_json::to_string(&event).unwrap();

        // then: the clear instruction carries no payload on the wire
        assert_eq!(json, r#"{"event":"updateCanvas"}"#);
    }

    #[test]
    fn test_eraser_tool_uses_lowercase_tag() {
        // given:
        let event = ServerEvent::UpdateDrawing(StrokeSegment {
            x0: 0.5,
            y0: 0.5,
            x1: 10.0,
            y1: 20.0,
            color: "#ff6188".to_string(),
            size: 6.0,
            tool: Tool::Eraser,
        });

        // when:
        let json = serde_json::to_string(&event).unwrap();

        // then:
        assert!(json.contains(r#""event":"updateDrawing""#));
        assert!(json.contains(r#""tool":"eraser""#));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        // given: an event name outside the closed union
        let json = r#"{"event": "undoStroke", "data": {"room": "ABCD"}}"#;

        // when:
        let result = serde_json::from_str::<ClientEvent>(json);

        // then:
        assert!(result.is_err());
    }
}
