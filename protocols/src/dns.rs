//! Minimal DNS wire codec for reverse (PTR) lookups.

use std::fmt::Write;
use std::net::IpAddr;

use anyhow::Context;
use pnet::packet::dns::{
    DnsClass, DnsPacket, DnsQuery, DnsResponse, DnsTypes, MutableDnsPacket, Opcode, Retcode,
};

pub const DNS_HDR_LEN: usize = 12;

/// Upper bound on compression pointer hops while decoding one name.
const MAX_POINTER_HOPS: usize = 16;

/// Reverse-lookup name for `ip`: `4.3.2.1.in-addr.arpa` for IPv4 and the nibble form
/// under `ip6.arpa` for IPv6.
pub fn reverse_ptr_name(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{d}.{c}.{b}.{a}.in-addr.arpa")
        }
        IpAddr::V6(v6) => {
            let mut name = String::with_capacity(72);
            for byte in v6.octets().iter().rev() {
                let _ = write!(name, "{:x}.{:x}.", byte & 0x0f, byte >> 4);
            }
            name.push_str("ip6.arpa");
            name
        }
    }
}

/// Builds a recursive PTR query for `ip_addr` with transaction id `id`.
pub fn create_ptr_packet(ip_addr: &IpAddr, id: u16) -> anyhow::Result<Vec<u8>> {
    let query = create_ptr_query(ip_addr);
    let q_fixed_len: usize = 4;
    let total: usize = DNS_HDR_LEN + query.qname.len() + q_fixed_len;
    let mut buffer: Vec<u8> = vec![0u8; total];

    {
        let mut dns: MutableDnsPacket =
            MutableDnsPacket::new(&mut buffer).context("creating dns header")?;
        dns.set_id(id);
        dns.set_is_response(0);
        dns.set_opcode(Opcode::StandardQuery);
        dns.set_is_recursion_desirable(1);
        dns.set_rcode(Retcode::NoError);
        dns.set_query_count(1);
        dns.set_response_count(0);
        dns.set_authority_rr_count(0);
        dns.set_additional_rr_count(0);
    }

    let mut cursor: usize = DNS_HDR_LEN;
    buffer[cursor..cursor + query.qname.len()].copy_from_slice(&query.qname);
    cursor += query.qname.len();
    buffer[cursor..cursor + 2].copy_from_slice(&query.qtype.0.to_be_bytes());
    cursor += 2;
    buffer[cursor..cursor + 2].copy_from_slice(&query.qclass.0.to_be_bytes());

    Ok(buffer)
}

/// Extracts the transaction id and the first PTR target from a DNS response.
pub fn parse_ptr_response(payload: &[u8]) -> anyhow::Result<(u16, String)> {
    let dns = DnsPacket::new(payload).context("failed to parse DNS packet")?;
    let transaction_id = dns.get_id();
    let hostname = dns
        .get_responses()
        .iter()
        .filter(|response| response.rtype == DnsTypes::PTR)
        .find_map(|response| hostname_from_ptr(response, payload))
        .context("no PTR record in response")?;

    Ok((transaction_id, hostname))
}

fn hostname_from_ptr(response: &DnsResponse, message: &[u8]) -> Option<String> {
    let name = decode_dns_name(&response.data, message)?;
    let name = name.trim_end_matches('.');
    (!name.is_empty()).then(|| name.to_string())
}

fn create_ptr_query(ip_addr: &IpAddr) -> DnsQuery {
    DnsQuery {
        qname: encode_dns_name(&reverse_ptr_name(ip_addr)),
        qtype: DnsTypes::PTR,
        qclass: DnsClass(1),
        payload: Vec::new(),
    }
}

fn encode_dns_name(name: &str) -> Vec<u8> {
    let mut encoded: Vec<u8> = Vec::new();
    for label in name.split('.') {
        if label.is_empty() {
            continue;
        }
        encoded.push(label.len() as u8);
        encoded.extend_from_slice(label.as_bytes());
    }
    encoded.push(0);
    encoded
}

/// Decodes a possibly compressed name. `data` holds the name itself and `message` is
/// the full DNS message that compression pointers index into.
fn decode_dns_name(data: &[u8], message: &[u8]) -> Option<String> {
    let mut labels: Vec<String> = Vec::new();
    let mut buf: &[u8] = data;
    let mut cursor: usize = 0;
    let mut hops: usize = 0;

    loop {
        let len = *buf.get(cursor)? as usize;
        match len {
            0 => break,
            l if l & 0xC0 == 0xC0 => {
                let low = *buf.get(cursor + 1)? as usize;
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return None;
                }
                buf = message;
                cursor = ((l & 0x3F) << 8) | low;
            }
            l => {
                let label = buf.get(cursor + 1..cursor + 1 + l)?;
                labels.push(std::str::from_utf8(label).ok()?.to_string());
                cursor += 1 + l;
            }
        }
    }

    Some(labels.join("."))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_name_ipv4() {
        let ip: IpAddr = "192.0.2.10".parse().unwrap();
        assert_eq!(reverse_ptr_name(&ip), "10.2.0.192.in-addr.arpa");
    }

    #[test]
    fn reverse_name_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(
            reverse_ptr_name(&ip),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn ptr_query_layout() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let packet = create_ptr_packet(&ip, 0xBEEF).unwrap();

        assert_eq!(&packet[0..2], &[0xBE, 0xEF]);
        // one question, recursion desired
        assert_eq!(packet[2] & 0x01, 0x01);
        assert_eq!(&packet[4..6], &[0, 1]);

        let qname = encode_dns_name("1.0.0.10.in-addr.arpa");
        assert_eq!(&packet[DNS_HDR_LEN..DNS_HDR_LEN + qname.len()], qname.as_slice());
        let tail = &packet[packet.len() - 4..];
        assert_eq!(tail, &[0, 12, 0, 1]);
    }

    #[test]
    fn decode_plain_and_compressed_names() {
        let encoded = encode_dns_name("router.lan");
        assert_eq!(decode_dns_name(&encoded, &[]).as_deref(), Some("router.lan"));

        // "lan" lives at offset 2 of the message; the name is "gw" + pointer to it
        let message = [0u8, 0, 3, b'l', b'a', b'n', 0];
        let data = [2u8, b'g', b'w', 0xC0, 2];
        assert_eq!(decode_dns_name(&data, &message).as_deref(), Some("gw.lan"));
    }

    #[test]
    fn decode_rejects_pointer_loops_and_truncation() {
        let message = [0xC0u8, 0];
        assert_eq!(decode_dns_name(&message, &message), None);
        assert_eq!(decode_dns_name(&[5, b'a', b'b'], &[]), None);
    }

    #[test]
    fn parse_response_with_compressed_answer() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let mut message = create_ptr_packet(&ip, 7).unwrap();
        // QR + RD + RA, one answer
        message[2] = 0x81;
        message[3] = 0x80;
        message[7] = 1;

        let rdata = [6u8, b'r', b'o', b'u', b't', b'e', b'r', 3, b'l', b'a', b'n', 0];
        message.extend_from_slice(&[0xC0, DNS_HDR_LEN as u8]);
        message.extend_from_slice(&12u16.to_be_bytes());
        message.extend_from_slice(&1u16.to_be_bytes());
        message.extend_from_slice(&300u32.to_be_bytes());
        message.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        message.extend_from_slice(&rdata);

        let (id, hostname) = parse_ptr_response(&message).unwrap();
        assert_eq!(id, 7);
        assert_eq!(hostname, "router.lan");
    }
}
