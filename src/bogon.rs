// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Reserved and non-routable address ranges
//!
//! Lookups for these addresses are answered locally: the service has nothing
//! to say about them beyond `bogon: true`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// `(network, prefix length)`
const BOGON_V4: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 0, 0, 0), 24),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(224, 0, 0, 0), 4),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
];

const BOGON_V6: &[(Ipv6Addr, u8)] = &[
    // unspecified and loopback
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 128),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), 128),
    // IPv4-mapped and IPv4-compatible
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0), 96),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 96),
    // discard-only
    (Ipv6Addr::new(0x100, 0, 0, 0, 0, 0, 0, 0), 64),
    // ORCHID
    (Ipv6Addr::new(0x2001, 0x10, 0, 0, 0, 0, 0, 0), 28),
    // documentation
    (Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 32),
    // unique local
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    // link local
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
    // site local (deprecated)
    (Ipv6Addr::new(0xfec0, 0, 0, 0, 0, 0, 0, 0), 10),
    // multicast
    (Ipv6Addr::new(0xff00, 0, 0, 0, 0, 0, 0, 0), 8),
    // 6to4 encapsulations of IPv4 bogons
    (Ipv6Addr::new(0x2002, 0, 0, 0, 0, 0, 0, 0), 24),
    (Ipv6Addr::new(0x2002, 0x0a00, 0, 0, 0, 0, 0, 0), 24),
    (Ipv6Addr::new(0x2002, 0x7f00, 0, 0, 0, 0, 0, 0), 24),
    (Ipv6Addr::new(0x2002, 0xa9fe, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0x2002, 0xac10, 0, 0, 0, 0, 0, 0), 28),
    (Ipv6Addr::new(0x2002, 0xc000, 0, 0, 0, 0, 0, 0), 40),
    (Ipv6Addr::new(0x2002, 0xc000, 0x0200, 0, 0, 0, 0, 0), 40),
    (Ipv6Addr::new(0x2002, 0xc0a8, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0x2002, 0xc612, 0, 0, 0, 0, 0, 0), 31),
    (Ipv6Addr::new(0x2002, 0xc633, 0x6400, 0, 0, 0, 0, 0), 40),
    (Ipv6Addr::new(0x2002, 0xcb00, 0x7100, 0, 0, 0, 0, 0), 40),
    (Ipv6Addr::new(0x2002, 0xe000, 0, 0, 0, 0, 0, 0), 20),
    (Ipv6Addr::new(0x2002, 0xf000, 0, 0, 0, 0, 0, 0), 20),
    (Ipv6Addr::new(0x2002, 0xffff, 0xffff, 0, 0, 0, 0, 0), 48),
    // Teredo
    (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 32),
];

fn mask_u32(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

fn mask_u128(prefix: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0)
}

fn in_v4(addr: Ipv4Addr, network: Ipv4Addr, prefix: u8) -> bool {
    let mask = mask_u32(prefix);
    u32::from(addr) & mask == u32::from(network) & mask
}

fn in_v6(addr: Ipv6Addr, network: Ipv6Addr, prefix: u8) -> bool {
    let mask = mask_u128(prefix);
    u128::from(addr) & mask == u128::from(network) & mask
}

/// Whether `ip` falls in a reserved or non-routable range
///
/// ```
/// use ipinfo_client::bogon::is_bogon;
///
/// assert!(is_bogon("192.168.1.1".parse().unwrap()));
/// assert!(!is_bogon("8.8.8.8".parse().unwrap()));
/// ```
pub fn is_bogon(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => BOGON_V4
            .iter()
            .any(|&(network, prefix)| in_v4(addr, network, prefix)),
        IpAddr::V6(addr) => BOGON_V6
            .iter()
            .any(|&(network, prefix)| in_v6(addr, network, prefix)),
    }
}
