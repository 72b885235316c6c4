use crate::config::RecordType;
use thiserror::Error;

pub(super) const HEADER_LEN: usize = 12;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const FLAG_RECURSION_DESIRED: u16 = 0x0100;
const FLAG_RESPONSE: u16 = 0x8000;
const CLASS_IN: u16 = 1;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub(super) enum WireError {
    #[error("empty label in domain name")]
    EmptyLabel,
    #[error("label `{0}` exceeds 63 bytes")]
    LabelTooLong(String),
    #[error("domain name exceeds 255 bytes")]
    NameTooLong,
    #[error("packet of {0} bytes is shorter than a dns header")]
    Truncated(usize),
    #[error("response id {got} does not match query id {expected}")]
    IdMismatch { expected: u16, got: u16 },
    #[error("packet is not a response")]
    NotResponse,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct ResponseHeader {
    pub(super) id: u16,
    pub(super) rcode: u8,
    pub(super) answer_count: u16,
}

pub(super) fn encode_name(domain: &str) -> Result<Vec<u8>, WireError> {
    let trimmed = domain.trim().trim_end_matches('.');
    let mut out = Vec::with_capacity(trimmed.len() + 2);
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(WireError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(WireError::LabelTooLong(label.to_string()));
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    if out.len() > MAX_NAME_LEN {
        return Err(WireError::NameTooLong);
    }
    Ok(out)
}

/// Single-question recursive query for `domain` / `record_type` in class IN.
pub(super) fn encode_query(
    id: u16,
    domain: &str,
    record_type: RecordType,
) -> Result<Vec<u8>, WireError> {
    let name = encode_name(domain)?;
    let mut packet = Vec::with_capacity(HEADER_LEN + name.len() + 4);
    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&FLAG_RECURSION_DESIRED.to_be_bytes());
    packet.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    packet.extend_from_slice(&[0; 6]); // an/ns/ar counts
    packet.extend_from_slice(&name);
    packet.extend_from_slice(&record_type.code().to_be_bytes());
    packet.extend_from_slice(&CLASS_IN.to_be_bytes());
    Ok(packet)
}

pub(super) fn parse_response_header(
    packet: &[u8],
    expected_id: u16,
) -> Result<ResponseHeader, WireError> {
    if packet.len() < HEADER_LEN {
        return Err(WireError::Truncated(packet.len()));
    }
    let read_u16 = |offset: usize| u16::from_be_bytes([packet[offset], packet[offset + 1]]);

    let id = read_u16(0);
    if id != expected_id {
        return Err(WireError::IdMismatch {
            expected: expected_id,
            got: id,
        });
    }
    let flags = read_u16(2);
    if flags & FLAG_RESPONSE == 0 {
        return Err(WireError::NotResponse);
    }

    Ok(ResponseHeader {
        id,
        rcode: (flags & 0x000f) as u8,
        answer_count: read_u16(6),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(id: u16, flags: u16, answers: u16) -> Vec<u8> {
        let mut packet = Vec::new();
        packet.extend_from_slice(&id.to_be_bytes());
        packet.extend_from_slice(&flags.to_be_bytes());
        packet.extend_from_slice(&1u16.to_be_bytes());
        packet.extend_from_slice(&answers.to_be_bytes());
        packet.extend_from_slice(&[0; 4]);
        packet
    }

    #[test]
    fn encode_query_layout() {
        let packet = encode_query(0xabcd, "example.com", RecordType::Aaaa).expect("query");
        assert_eq!(&packet[..4], &[0xab, 0xcd, 0x01, 0x00]);
        assert_eq!(&packet[4..6], &[0x00, 0x01]);
        assert_eq!(
            &packet[HEADER_LEN..HEADER_LEN + 13],
            b"\x07example\x03com\x00"
        );
        assert_eq!(&packet[packet.len() - 4..], &[0x00, 28, 0x00, 0x01]);
    }

    #[test]
    fn encode_name_handles_root_and_trailing_dot() {
        assert_eq!(encode_name(".").expect("root"), vec![0]);
        assert_eq!(
            encode_name("a.b.").expect("fqdn"),
            encode_name("a.b").expect("plain")
        );
    }

    #[test]
    fn encode_name_rejects_bad_labels() {
        assert_eq!(encode_name("a..b"), Err(WireError::EmptyLabel));
        let long = "x".repeat(64);
        assert!(matches!(
            encode_name(&format!("{long}.com")),
            Err(WireError::LabelTooLong(_))
        ));
        let many = vec!["abcdefghij"; 30].join(".");
        assert_eq!(encode_name(&many), Err(WireError::NameTooLong));
    }

    #[test]
    fn parse_response_header_reads_rcode_and_answers() {
        let header = parse_response_header(&response(7, 0x8183, 0), 7).expect("header");
        assert_eq!(header.id, 7);
        assert_eq!(header.rcode, 3);
        assert_eq!(header.answer_count, 0);

        let header = parse_response_header(&response(7, 0x8180, 2), 7).expect("header");
        assert_eq!(header.rcode, 0);
        assert_eq!(header.answer_count, 2);
    }

    #[test]
    fn parse_response_header_rejects_mismatches() {
        assert_eq!(
            parse_response_header(&response(8, 0x8180, 1), 7),
            Err(WireError::IdMismatch {
                expected: 7,
                got: 8
            })
        );
        assert_eq!(
            parse_response_header(&response(7, 0x0100, 1), 7),
            Err(WireError::NotResponse)
        );
        assert_eq!(
            parse_response_header(&[0; 5], 7),
            Err(WireError::Truncated(5))
        );
    }
}
