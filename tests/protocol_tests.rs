use transcriber_bridge::bridge::protocol::{Channel, InboundMessage, TranscriberResponse};

#[test]
fn test_start_message_parsing() {
    let json = r#"{
        "type": "start",
        "encoding": "linear16",
        "container": "raw",
        "sampleRate": 16000,
        "channels": 2
    }"#;

    let msg: InboundMessage = serde_json::from_str(json).unwrap();
    let InboundMessage::Start {
        encoding,
        container,
        sample_rate,
        channels,
    } = msg;

    assert_eq!(encoding, "linear16");
    assert_eq!(container, "raw");
    assert_eq!(sample_rate, 16000);
    assert_eq!(channels, 2);
}

#[test]
fn test_start_message_rejects_other_types() {
    let json = r#"{"type": "stop"}"#;
    let result: Result<InboundMessage, _> = serde_json::from_str(json);
    assert!(result.is_err(), "Only start messages are valid first messages");
}

#[test]
fn test_start_message_rejects_missing_fields() {
    let json = r#"{"type": "start", "encoding": "linear16"}"#;
    let result: Result<InboundMessage, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn test_transcriber_response_shape() {
    let response = TranscriberResponse::new(Channel::Customer, "Hello there".to_string());

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"type\":\"transcriber-response\""));
    assert!(json.contains("\"transcription\":\"Hello there\""));
    assert!(json.contains("\"channel\":\"customer\""));
}

#[test]
fn test_transcriber_response_assistant_leg() {
    let response = TranscriberResponse::new(Channel::Assistant, "How can I help?".to_string());

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"channel\":\"assistant\""));

    let parsed: TranscriberResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.channel, Channel::Assistant);
    assert_eq!(parsed.transcription, "How can I help?");
}

#[test]
fn test_channel_index_mapping() {
    assert_eq!(Channel::from_index(0), Some(Channel::Customer));
    assert_eq!(Channel::from_index(1), Some(Channel::Assistant));
    assert_eq!(Channel::from_index(2), None);

    assert_eq!(Channel::Customer.index(), 0);
    assert_eq!(Channel::Assistant.index(), 1);
}
