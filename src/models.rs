// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Records returned by the lookup service
//!
//! Every field defaults when absent: the service omits fields that are
//! empty, or that the token's plan does not include.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::countries;

/// Details about an IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpDetails {
    pub ip: String,
    pub hostname: String,
    pub city: String,
    pub region: String,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
    /// `"<latitude>,<longitude>"`
    pub loc: String,
    pub org: String,
    pub postal: String,
    pub timezone: String,
    pub asn: Option<IpAsn>,
    pub company: Option<Company>,
    pub carrier: Option<Carrier>,
    pub privacy: Option<Privacy>,
    pub abuse: Option<Abuse>,
    pub domains: Option<Domains>,
    /// Reserved or non-routable address, answered without a network call
    pub bogon: bool,
    pub anycast: bool,

    /// Display name of `country`, filled in by the client
    #[serde(skip_deserializing)]
    pub country_name: String,
    /// Whether `country` is an EU member state, filled in by the client
    #[serde(skip_deserializing)]
    pub is_eu: bool,
    #[serde(skip_deserializing)]
    pub country_flag: CountryFlag,
    #[serde(skip_deserializing)]
    pub country_flag_url: String,
    #[serde(skip_deserializing)]
    pub country_currency: CountryCurrency,
    #[serde(skip_deserializing)]
    pub continent_info: Continent,
}

impl IpDetails {
    /// The record returned for a bogon address
    pub fn bogon(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_string(),
            bogon: true,
            ..Self::default()
        }
    }

    /// Fills in the country name, EU membership, flag, currency and
    /// continent from `country`
    pub fn enrich(&mut self) {
        if let Some(info) = countries::country_info(&self.country) {
            self.country_name = info.name;
            self.is_eu = info.is_eu;
            self.country_flag = info.flag;
            self.country_flag_url = info.flag_url;
            self.country_currency = info.currency;
            self.continent_info = info.continent;
        }
    }

    /// Parses `loc` into `(latitude, longitude)`
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lon) = self.loc.split_once(',')?;
        Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
    }
}

/// Flag of a country
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryFlag {
    pub emoji: String,
    /// Code points of the emoji, e.g. `"U+1F1E9 U+1F1EA"`
    pub unicode: String,
}

/// Currency used in a country
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryCurrency {
    /// ISO 4217 code
    pub code: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Continent {
    pub code: String,
    pub name: String,
}

/// Lite tier record: country and autonomous system only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteDetails {
    pub ip: String,
    pub asn: String,
    pub as_name: String,
    pub as_domain: String,
    pub country_code: String,
    /// Country name as sent by the service
    pub country: String,
    pub continent_code: String,
    pub continent: String,
    pub bogon: bool,

    #[serde(skip_deserializing)]
    pub country_name: String,
    #[serde(skip_deserializing)]
    pub is_eu: bool,
    #[serde(skip_deserializing)]
    pub country_flag: CountryFlag,
    #[serde(skip_deserializing)]
    pub country_flag_url: String,
    #[serde(skip_deserializing)]
    pub country_currency: CountryCurrency,
    #[serde(skip_deserializing)]
    pub continent_info: Continent,
}

impl LiteDetails {
    pub fn bogon(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_string(),
            bogon: true,
            ..Self::default()
        }
    }

    /// Fills in the derived country fields from `country_code`
    pub fn enrich(&mut self) {
        if let Some(info) = countries::country_info(&self.country_code) {
            self.country_name = info.name;
            self.is_eu = info.is_eu;
            self.country_flag = info.flag;
            self.country_flag_url = info.flag_url;
            self.country_currency = info.currency;
            self.continent_info = info.continent;
        }
    }
}

/// Location block of the core and plus tier records
///
/// The plus-only fields stay at their defaults in core records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geo {
    pub city: String,
    pub region: String,
    pub region_code: String,
    /// Country name as sent by the service
    pub country: String,
    pub country_code: String,
    pub continent: String,
    pub continent_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub postal_code: String,
    /// Nielsen designated market area
    pub dma_code: String,
    pub geoname_id: String,
    /// Accuracy radius in kilometres
    pub radius: u32,
    pub last_changed: String,

    #[serde(skip_deserializing)]
    pub country_name: String,
    #[serde(skip_deserializing)]
    pub is_eu: bool,
    #[serde(skip_deserializing)]
    pub country_flag: CountryFlag,
    #[serde(skip_deserializing)]
    pub country_flag_url: String,
    #[serde(skip_deserializing)]
    pub country_currency: CountryCurrency,
    #[serde(skip_deserializing)]
    pub continent_info: Continent,
}

impl Geo {
    fn enrich(&mut self) {
        if let Some(info) = countries::country_info(&self.country_code) {
            self.country_name = info.name;
            self.is_eu = info.is_eu;
            self.country_flag = info.flag;
            self.country_flag_url = info.flag_url;
            self.country_currency = info.currency;
            self.continent_info = info.continent;
        }
    }
}

/// Autonomous system block of the core and plus tier records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsInfo {
    pub asn: String,
    pub name: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Plus tier only
    pub last_changed: String,
}

/// Core tier record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreDetails {
    pub ip: String,
    pub bogon: bool,
    pub geo: Option<Geo>,
    #[serde(rename = "as")]
    pub as_info: Option<AsInfo>,
    pub is_anonymous: bool,
    pub is_anycast: bool,
    pub is_hosting: bool,
    pub is_mobile: bool,
    pub is_satellite: bool,
}

impl CoreDetails {
    pub fn bogon(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_string(),
            bogon: true,
            ..Self::default()
        }
    }

    pub fn enrich(&mut self) {
        if let Some(geo) = self.geo.as_mut() {
            geo.enrich();
        }
    }
}

/// Anonymity details of a plus tier record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anonymous {
    pub is_proxy: bool,
    pub is_relay: bool,
    pub is_tor: bool,
    pub is_vpn: bool,
    /// Anonymizing service, when known
    pub name: String,
}

/// Plus tier record: the core record with network ownership and privacy
/// details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlusDetails {
    pub ip: String,
    pub hostname: String,
    pub bogon: bool,
    pub geo: Option<Geo>,
    #[serde(rename = "as")]
    pub as_info: Option<AsInfo>,
    pub mobile: Option<Carrier>,
    pub anonymous: Option<Anonymous>,
    pub is_anonymous: bool,
    pub is_anycast: bool,
    pub is_hosting: bool,
    pub is_mobile: bool,
    pub is_satellite: bool,
    pub abuse: Option<Abuse>,
    pub company: Option<Company>,
    pub privacy: Option<Privacy>,
    pub domains: Option<Domains>,
}

impl PlusDetails {
    pub fn bogon(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_string(),
            bogon: true,
            ..Self::default()
        }
    }

    /// Enriches the location block and names the abuse contact's country
    pub fn enrich(&mut self) {
        if let Some(geo) = self.geo.as_mut() {
            geo.enrich();
        }
        if let Some(abuse) = self.abuse.as_mut() {
            if let Some(name) = countries::country_name(&abuse.country) {
                abuse.country_name = name.to_string();
            }
        }
    }
}

/// Autonomous system announcing an IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAsn {
    pub asn: String,
    pub name: String,
    pub domain: String,
    pub route: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Mobile carrier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Carrier {
    pub name: String,
    /// Mobile country code
    pub mcc: String,
    /// Mobile network code
    pub mnc: String,
}

/// Privacy and anonymity flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Privacy {
    pub vpn: bool,
    pub proxy: bool,
    pub tor: bool,
    pub relay: bool,
    pub hosting: bool,
    /// Name of the VPN or proxy service, when known
    pub service: String,
}

/// Abuse contact for the network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Abuse {
    pub address: String,
    pub country: String,
    pub country_name: String,
    pub email: String,
    pub name: String,
    pub network: String,
    pub phone: String,
}

/// Domains hosted on an IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domains {
    pub ip: String,
    pub total: u64,
    pub domains: Vec<String>,
}

/// Details about an autonomous system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsnDetails {
    /// Identifier, e.g. `AS15169`
    pub asn: String,
    pub name: String,
    pub country: String,
    /// Allocation date, `YYYY-MM-DD`
    pub allocated: String,
    pub registry: String,
    pub domain: String,
    pub num_ips: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub prefixes: Vec<AsnPrefix>,
    pub prefixes6: Vec<AsnPrefix>,
    pub peers: Vec<String>,
    pub upstreams: Vec<String>,
    pub downstreams: Vec<String>,

    /// Display name of `country`, filled in by the client
    #[serde(skip_deserializing)]
    pub country_name: String,
}

impl AsnDetails {
    /// Fills in `country_name` from `country`
    pub fn enrich(&mut self) {
        if !self.country.is_empty() {
            self.country_name = countries::country_name(&self.country)
                .unwrap_or_default()
                .to_string();
        }
    }
}

/// A network announced by an autonomous system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsnPrefix {
    /// CIDR block
    pub netblock: String,
    pub id: String,
    pub name: String,
    pub country: String,
    pub size: String,
    pub status: String,
    pub domain: String,
}

/// Residential proxy observations for an IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResproxyDetails {
    pub ip: String,
    /// Date the address was last seen acting as a proxy
    pub last_seen: String,
    pub percent_days_seen: f64,
    /// Proxy service the address was attributed to
    pub service: String,
}

/// Aggregate statistics over a list of IP addresses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpSummary {
    pub total: u64,
    pub unique: u64,
    pub countries: HashMap<String, u64>,
    pub cities: HashMap<String, u64>,
    pub regions: HashMap<String, u64>,
    pub asns: HashMap<String, u64>,
    pub companies: HashMap<String, u64>,
    #[serde(rename = "ipTypes")]
    pub ip_types: HashMap<String, u64>,
    pub routes: HashMap<String, u64>,
    pub carriers: HashMap<String, u64>,
    pub mobile: u64,
    pub domains: HashMap<String, u64>,
    pub privacy: PrivacyCounts,
    pub anycast: u64,
    pub bogon: u64,
}

/// Privacy flag counts within an [`IpSummary`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyCounts {
    pub vpn: u64,
    pub proxy: u64,
    pub hosting: u64,
    pub tor: u64,
}

/// A single attribute of an IP address that can be fetched as plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ip,
    Hostname,
    City,
    Region,
    Country,
    Loc,
    Org,
    Postal,
    Timezone,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Ip,
        Field::Hostname,
        Field::City,
        Field::Region,
        Field::Country,
        Field::Loc,
        Field::Org,
        Field::Postal,
        Field::Timezone,
    ];

    /// Path segment of the field endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Ip => "ip",
            Field::Hostname => "hostname",
            Field::City => "city",
            Field::Region => "region",
            Field::Country => "country",
            Field::Loc => "loc",
            Field::Org => "org",
            Field::Postal => "postal",
            Field::Timezone => "timezone",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}
