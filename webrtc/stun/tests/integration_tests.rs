use std::net::SocketAddr;
use std::time::{Duration, Instant};

use logging::{LogLevel, Logger};
use stun::{
    Attribute, AttributeType, ClientBuilder, ClientEvent, ClientInput, ClientSettings,
    Fingerprint, Message, MessageBuilder, MessageIntegrity, MessageType, Priority, StunError,
    TextAttribute, TransportProtocol, XorMappedAddress, is_message,
};

const LOCAL: &str = "10.0.0.2:40000";
const SERVER: &str = "198.51.100.1:3478";
const REFLEXIVE: &str = "203.0.113.77:61000";
const PASSWORD: &str = "VOkJxbRl1RmTxUk/WvJxBt";

/// RFC 5769 Section 2.1 sample request.
const SAMPLE_REQUEST: [u8; 108] = [
    0x00, 0x01, 0x00, 0x58, 0x21, 0x12, 0xa4, 0x42, 0xb7, 0xe7, 0xa7, 0x01, 0xbc, 0x34, 0xd6,
    0x86, 0xfa, 0x87, 0xdf, 0xae, 0x80, 0x22, 0x00, 0x10, 0x53, 0x54, 0x55, 0x4e, 0x20, 0x74,
    0x65, 0x73, 0x74, 0x20, 0x63, 0x6c, 0x69, 0x65, 0x6e, 0x74, 0x00, 0x24, 0x00, 0x04, 0x6e,
    0x00, 0x01, 0xff, 0x80, 0x29, 0x00, 0x08, 0x93, 0x2f, 0xf9, 0xb1, 0x51, 0x26, 0x3b, 0x36,
    0x00, 0x06, 0x00, 0x09, 0x65, 0x76, 0x74, 0x6a, 0x3a, 0x68, 0x36, 0x76, 0x59, 0x20, 0x20,
    0x20, 0x00, 0x08, 0x00, 0x14, 0x9a, 0xea, 0xa7, 0x0c, 0xbf, 0xd8, 0xcb, 0x56, 0x78, 0x1e,
    0xf2, 0xb5, 0xb2, 0xd3, 0xf2, 0x49, 0xc1, 0xb5, 0x71, 0xa2, 0x80, 0x28, 0x00, 0x04, 0xe5,
    0x7a, 0x3b, 0xcf,
];

/// Minimal Binding server: answers with the reflexive address, signed and
/// fingerprinted.
fn serve_binding(request: &[u8]) -> Vec<u8> {
    let request = Message::decode(request).unwrap();
    assert_eq!(request.message_type(), MessageType::BINDING_REQUEST);

    MessageBuilder::new(MessageType::BINDING_SUCCESS)
        .transaction_id(request.transaction_id())
        .attribute(Attribute::XorMappedAddress(XorMappedAddress::new(
            REFLEXIVE.parse().unwrap(),
        )))
        .attribute(Attribute::Text(TextAttribute::software("test server")))
        .attribute(Attribute::MessageIntegrity(MessageIntegrity::new_short_term(
            PASSWORD,
        )))
        .attribute(Attribute::Fingerprint)
        .build()
        .unwrap()
        .encode()
}

#[test]
fn test_rfc5769_sample_request_verifies() {
    assert!(is_message(&SAMPLE_REQUEST));
    let message = Message::decode(&SAMPLE_REQUEST).unwrap();

    assert_eq!(message.message_type(), MessageType::BINDING_REQUEST);
    assert_eq!(message.attributes.len(), 6);
    assert_eq!(
        TextAttribute::get_from_as(&message, AttributeType::SOFTWARE)
            .unwrap()
            .text,
        "STUN test client"
    );
    assert_eq!(
        TextAttribute::get_from_as(&message, AttributeType::USERNAME)
            .unwrap()
            .text,
        "evtj:h6vY"
    );
    assert_eq!(Priority::get_from(&message).unwrap(), Priority(0x6e0001ff));

    MessageIntegrity::new_short_term(PASSWORD)
        .check(&message)
        .unwrap();
    Fingerprint::check(&message).unwrap();

    assert_eq!(
        MessageIntegrity::new_short_term("wrong").check(&message),
        Err(StunError::IntegrityMismatch)
    );
}

#[test]
fn test_binding_exchange_through_client() {
    let logger = Logger::in_memory(LogLevel::Info);
    let mut client = ClientBuilder::new().with_logger(logger.clone()).build(
        LOCAL.parse().unwrap(),
        SERVER.parse().unwrap(),
        TransportProtocol::Udp,
    );

    let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
        .attribute(Attribute::Text(TextAttribute::software("roomrtc")))
        .attribute(Attribute::Fingerprint)
        .build()
        .unwrap();
    let id = request.transaction_id();
    client.handle_write(request, Instant::now()).unwrap();

    let transmit = client.poll_write().unwrap();
    assert_eq!(transmit.remote, SERVER.parse::<SocketAddr>().unwrap());
    client.handle_read(&serve_binding(&transmit.payload)).unwrap();

    let event = loop {
        match client.poll_event() {
            Some(ClientEvent::Transaction(event)) => break event,
            Some(ClientEvent::Timeout(_)) => continue,
            None => panic!("no terminal event"),
        }
    };
    assert_eq!(event.id, id);

    let response = event.result.unwrap();
    MessageIntegrity::new_short_term(PASSWORD)
        .check(&response)
        .unwrap();
    Fingerprint::check(&response).unwrap();
    assert_eq!(
        XorMappedAddress::get_from(&response).unwrap().socket_addr(),
        REFLEXIVE.parse::<SocketAddr>().unwrap()
    );

    let lines = logger.captured().unwrap();
    assert!(lines.iter().any(|l| l.contains("succeeded after 0 retransmissions")));
}

#[test]
fn test_lost_first_transmit_is_retried() {
    let rto = Duration::from_millis(50);
    let start = Instant::now();
    let mut client = ClientBuilder::new().with_rto(rto).build(
        LOCAL.parse().unwrap(),
        SERVER.parse().unwrap(),
        TransportProtocol::Tcp,
    );
    let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
        .build()
        .unwrap();
    client.handle_write(request, start).unwrap();

    // first datagram is lost
    let lost = client.poll_write().unwrap();
    assert_eq!(lost.protocol, TransportProtocol::Tcp);

    let Some(ClientEvent::Timeout(deadline)) = client.poll_event() else {
        panic!("expected a timeout hint");
    };
    let fired = deadline + Duration::from_millis(1);
    client.handle_event(ClientInput::Timeout(fired)).unwrap();
    assert_eq!(client.poll_event(), Some(ClientEvent::Timeout(fired + rto * 2)));

    let retry = client.poll_write().unwrap();
    assert_eq!(retry.payload, lost.payload);
    client.handle_read(&serve_binding(&retry.payload)).unwrap();

    // a duplicate answer to the lost datagram is ignored
    client.handle_read(&serve_binding(&lost.payload)).unwrap();

    let mut terminal = Vec::new();
    while let Some(event) = client.poll_event() {
        if let ClientEvent::Transaction(event) = event {
            terminal.push(event);
        }
    }
    assert_eq!(terminal.len(), 1);
    assert!(terminal[0].result.is_ok());
    assert_eq!(client.pending(), 0);
}

#[test]
fn test_client_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stun.toml");
    std::fs::write(
        &path,
        "# client tuning\n[stun]\nrto_ms = 20\nmax_attempts = 1\n",
    )
    .unwrap();

    let settings = ClientSettings::load(&path).unwrap();
    let mut client = ClientBuilder::from_settings(&settings).unwrap().build(
        LOCAL.parse().unwrap(),
        SERVER.parse().unwrap(),
        TransportProtocol::Udp,
    );

    let start = Instant::now();
    let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
        .build()
        .unwrap();
    client.handle_write(request, start).unwrap();
    assert_eq!(client.poll_timeout(), Some(start + Duration::from_millis(20)));

    let mut now = start;
    let mut transmits = 0;
    let terminal = loop {
        while client.poll_write().is_some() {
            transmits += 1;
        }
        match client.poll_event() {
            Some(ClientEvent::Timeout(deadline)) => {
                now = deadline + Duration::from_millis(1);
                client.handle_event(ClientInput::Timeout(now)).unwrap();
            }
            Some(ClientEvent::Transaction(event)) => break event,
            None => {}
        }
    };

    assert_eq!(transmits, 2);
    assert_eq!(terminal.result, Err(StunError::TransactionTimeOut));
}

#[test]
fn test_missing_settings_file() {
    assert!(matches!(
        ClientSettings::load("/nonexistent/stun.toml"),
        Err(StunError::Config(_))
    ));
}
