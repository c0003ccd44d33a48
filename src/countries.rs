// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Country code lookups used to enrich records
//!
//! Codes are ISO 3166-1 alpha-2 and matched case-insensitively.

use crate::models::{Continent, CountryCurrency, CountryFlag};

/// Everything derived from a country code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryInfo {
    pub name: String,
    pub is_eu: bool,
    pub flag: CountryFlag,
    pub flag_url: String,
    pub currency: CountryCurrency,
    pub continent: Continent,
}

/// EU member states
const EU_MEMBERS: [&str; 27] = [
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU", "IE", "IT",
    "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

/// `(code, name, continent, currency, currency symbol)`
type Row = (&'static str, &'static str, &'static str, &'static str, &'static str);

/// Sorted by code
const COUNTRIES: &[Row] = &[
    ("AD", "Andorra", "EU", "EUR", "€"),
    ("AE", "United Arab Emirates", "AS", "AED", "د.إ"),
    ("AF", "Afghanistan", "AS", "AFN", "؋"),
    ("AG", "Antigua and Barbuda", "NA", "XCD", "$"),
    ("AI", "Anguilla", "NA", "XCD", "$"),
    ("AL", "Albania", "EU", "ALL", "L"),
    ("AM", "Armenia", "AS", "AMD", "֏"),
    ("AO", "Angola", "AF", "AOA", "Kz"),
    ("AQ", "Antarctica", "AN", "USD", "$"),
    ("AR", "Argentina", "SA", "ARS", "$"),
    ("AS", "American Samoa", "OC", "USD", "$"),
    ("AT", "Austria", "EU", "EUR", "€"),
    ("AU", "Australia", "OC", "AUD", "$"),
    ("AW", "Aruba", "NA", "AWG", "ƒ"),
    ("AX", "Åland Islands", "EU", "EUR", "€"),
    ("AZ", "Azerbaijan", "AS", "AZN", "₼"),
    ("BA", "Bosnia and Herzegovina", "EU", "BAM", "KM"),
    ("BB", "Barbados", "NA", "BBD", "$"),
    ("BD", "Bangladesh", "AS", "BDT", "৳"),
    ("BE", "Belgium", "EU", "EUR", "€"),
    ("BF", "Burkina Faso", "AF", "XOF", "CFA"),
    ("BG", "Bulgaria", "EU", "BGN", "лв"),
    ("BH", "Bahrain", "AS", "BHD", ".د.ب"),
    ("BI", "Burundi", "AF", "BIF", "FBu"),
    ("BJ", "Benin", "AF", "XOF", "CFA"),
    ("BL", "Saint Barthélemy", "NA", "EUR", "€"),
    ("BM", "Bermuda", "NA", "BMD", "$"),
    ("BN", "Brunei", "AS", "BND", "$"),
    ("BO", "Bolivia", "SA", "BOB", "Bs."),
    ("BQ", "Bonaire, Sint Eustatius and Saba", "NA", "USD", "$"),
    ("BR", "Brazil", "SA", "BRL", "R$"),
    ("BS", "Bahamas", "NA", "BSD", "$"),
    ("BT", "Bhutan", "AS", "BTN", "Nu."),
    ("BV", "Bouvet Island", "AN", "NOK", "kr"),
    ("BW", "Botswana", "AF", "BWP", "P"),
    ("BY", "Belarus", "EU", "BYN", "Br"),
    ("BZ", "Belize", "NA", "BZD", "$"),
    ("CA", "Canada", "NA", "CAD", "$"),
    ("CC", "Cocos (Keeling) Islands", "AS", "AUD", "$"),
    ("CD", "DR Congo", "AF", "CDF", "FC"),
    ("CF", "Central African Republic", "AF", "XAF", "FCFA"),
    ("CG", "Republic of the Congo", "AF", "XAF", "FCFA"),
    ("CH", "Switzerland", "EU", "CHF", "CHF"),
    ("CI", "Ivory Coast", "AF", "XOF", "CFA"),
    ("CK", "Cook Islands", "OC", "NZD", "$"),
    ("CL", "Chile", "SA", "CLP", "$"),
    ("CM", "Cameroon", "AF", "XAF", "FCFA"),
    ("CN", "China", "AS", "CNY", "¥"),
    ("CO", "Colombia", "SA", "COP", "$"),
    ("CR", "Costa Rica", "NA", "CRC", "₡"),
    ("CU", "Cuba", "NA", "CUP", "$"),
    ("CV", "Cabo Verde", "AF", "CVE", "$"),
    ("CW", "Curaçao", "NA", "ANG", "ƒ"),
    ("CX", "Christmas Island", "AS", "AUD", "$"),
    ("CY", "Cyprus", "EU", "EUR", "€"),
    ("CZ", "Czechia", "EU", "CZK", "Kč"),
    ("DE", "Germany", "EU", "EUR", "€"),
    ("DJ", "Djibouti", "AF", "DJF", "Fdj"),
    ("DK", "Denmark", "EU", "DKK", "kr"),
    ("DM", "Dominica", "NA", "XCD", "$"),
    ("DO", "Dominican Republic", "NA", "DOP", "$"),
    ("DZ", "Algeria", "AF", "DZD", "دج"),
    ("EC", "Ecuador", "SA", "USD", "$"),
    ("EE", "Estonia", "EU", "EUR", "€"),
    ("EG", "Egypt", "AF", "EGP", "£"),
    ("EH", "Western Sahara", "AF", "MAD", "DH"),
    ("ER", "Eritrea", "AF", "ERN", "Nfk"),
    ("ES", "Spain", "EU", "EUR", "€"),
    ("ET", "Ethiopia", "AF", "ETB", "Br"),
    ("FI", "Finland", "EU", "EUR", "€"),
    ("FJ", "Fiji", "OC", "FJD", "$"),
    ("FK", "Falkland Islands", "SA", "FKP", "£"),
    ("FM", "Micronesia", "OC", "USD", "$"),
    ("FO", "Faroe Islands", "EU", "DKK", "kr"),
    ("FR", "France", "EU", "EUR", "€"),
    ("GA", "Gabon", "AF", "XAF", "FCFA"),
    ("GB", "United Kingdom", "EU", "GBP", "£"),
    ("GD", "Grenada", "NA", "XCD", "$"),
    ("GE", "Georgia", "AS", "GEL", "₾"),
    ("GF", "French Guiana", "SA", "EUR", "€"),
    ("GG", "Guernsey", "EU", "GBP", "£"),
    ("GH", "Ghana", "AF", "GHS", "₵"),
    ("GI", "Gibraltar", "EU", "GIP", "£"),
    ("GL", "Greenland", "NA", "DKK", "kr"),
    ("GM", "Gambia", "AF", "GMD", "D"),
    ("GN", "Guinea", "AF", "GNF", "FG"),
    ("GP", "Guadeloupe", "NA", "EUR", "€"),
    ("GQ", "Equatorial Guinea", "AF", "XAF", "FCFA"),
    ("GR", "Greece", "EU", "EUR", "€"),
    ("GS", "South Georgia and the South Sandwich Islands", "AN", "GBP", "£"),
    ("GT", "Guatemala", "NA", "GTQ", "Q"),
    ("GU", "Guam", "OC", "USD", "$"),
    ("GW", "Guinea-Bissau", "AF", "XOF", "CFA"),
    ("GY", "Guyana", "SA", "GYD", "$"),
    ("HK", "Hong Kong", "AS", "HKD", "$"),
    ("HM", "Heard Island and McDonald Islands", "AN", "AUD", "$"),
    ("HN", "Honduras", "NA", "HNL", "L"),
    ("HR", "Croatia", "EU", "EUR", "€"),
    ("HT", "Haiti", "NA", "HTG", "G"),
    ("HU", "Hungary", "EU", "HUF", "Ft"),
    ("ID", "Indonesia", "AS", "IDR", "Rp"),
    ("IE", "Ireland", "EU", "EUR", "€"),
    ("IL", "Israel", "AS", "ILS", "₪"),
    ("IM", "Isle of Man", "EU", "GBP", "£"),
    ("IN", "India", "AS", "INR", "₹"),
    ("IO", "British Indian Ocean Territory", "AS", "USD", "$"),
    ("IQ", "Iraq", "AS", "IQD", "ع.د"),
    ("IR", "Iran", "AS", "IRR", "﷼"),
    ("IS", "Iceland", "EU", "ISK", "kr"),
    ("IT", "Italy", "EU", "EUR", "€"),
    ("JE", "Jersey", "EU", "GBP", "£"),
    ("JM", "Jamaica", "NA", "JMD", "$"),
    ("JO", "Jordan", "AS", "JOD", "د.ا"),
    ("JP", "Japan", "AS", "JPY", "¥"),
    ("KE", "Kenya", "AF", "KES", "KSh"),
    ("KG", "Kyrgyzstan", "AS", "KGS", "с"),
    ("KH", "Cambodia", "AS", "KHR", "៛"),
    ("KI", "Kiribati", "OC", "AUD", "$"),
    ("KM", "Comoros", "AF", "KMF", "CF"),
    ("KN", "St Kitts and Nevis", "NA", "XCD", "$"),
    ("KP", "North Korea", "AS", "KPW", "₩"),
    ("KR", "South Korea", "AS", "KRW", "₩"),
    ("KW", "Kuwait", "AS", "KWD", "د.ك"),
    ("KY", "Cayman Islands", "NA", "KYD", "$"),
    ("KZ", "Kazakhstan", "AS", "KZT", "₸"),
    ("LA", "Laos", "AS", "LAK", "₭"),
    ("LB", "Lebanon", "AS", "LBP", "ل.ل"),
    ("LC", "Saint Lucia", "NA", "XCD", "$"),
    ("LI", "Liechtenstein", "EU", "CHF", "CHF"),
    ("LK", "Sri Lanka", "AS", "LKR", "Rs"),
    ("LR", "Liberia", "AF", "LRD", "$"),
    ("LS", "Lesotho", "AF", "LSL", "L"),
    ("LT", "Lithuania", "EU", "EUR", "€"),
    ("LU", "Luxembourg", "EU", "EUR", "€"),
    ("LV", "Latvia", "EU", "EUR", "€"),
    ("LY", "Libya", "AF", "LYD", "ل.د"),
    ("MA", "Morocco", "AF", "MAD", "DH"),
    ("MC", "Monaco", "EU", "EUR", "€"),
    ("MD", "Moldova", "EU", "MDL", "L"),
    ("ME", "Montenegro", "EU", "EUR", "€"),
    ("MF", "Saint Martin", "NA", "EUR", "€"),
    ("MG", "Madagascar", "AF", "MGA", "Ar"),
    ("MH", "Marshall Islands", "OC", "USD", "$"),
    ("MK", "North Macedonia", "EU", "MKD", "ден"),
    ("ML", "Mali", "AF", "XOF", "CFA"),
    ("MM", "Myanmar", "AS", "MMK", "K"),
    ("MN", "Mongolia", "AS", "MNT", "₮"),
    ("MO", "Macao", "AS", "MOP", "P"),
    ("MP", "Northern Mariana Islands", "OC", "USD", "$"),
    ("MQ", "Martinique", "NA", "EUR", "€"),
    ("MR", "Mauritania", "AF", "MRU", "UM"),
    ("MS", "Montserrat", "NA", "XCD", "$"),
    ("MT", "Malta", "EU", "EUR", "€"),
    ("MU", "Mauritius", "AF", "MUR", "₨"),
    ("MV", "Maldives", "AS", "MVR", "Rf"),
    ("MW", "Malawi", "AF", "MWK", "MK"),
    ("MX", "Mexico", "NA", "MXN", "$"),
    ("MY", "Malaysia", "AS", "MYR", "RM"),
    ("MZ", "Mozambique", "AF", "MZN", "MT"),
    ("NA", "Namibia", "AF", "NAD", "$"),
    ("NC", "New Caledonia", "OC", "XPF", "₣"),
    ("NE", "Niger", "AF", "XOF", "CFA"),
    ("NF", "Norfolk Island", "OC", "AUD", "$"),
    ("NG", "Nigeria", "AF", "NGN", "₦"),
    ("NI", "Nicaragua", "NA", "NIO", "C$"),
    ("NL", "Netherlands", "EU", "EUR", "€"),
    ("NO", "Norway", "EU", "NOK", "kr"),
    ("NP", "Nepal", "AS", "NPR", "₨"),
    ("NR", "Nauru", "OC", "AUD", "$"),
    ("NU", "Niue", "OC", "NZD", "$"),
    ("NZ", "New Zealand", "OC", "NZD", "$"),
    ("OM", "Oman", "AS", "OMR", "ر.ع."),
    ("PA", "Panama", "NA", "PAB", "B/."),
    ("PE", "Peru", "SA", "PEN", "S/"),
    ("PF", "French Polynesia", "OC", "XPF", "₣"),
    ("PG", "Papua New Guinea", "OC", "PGK", "K"),
    ("PH", "Philippines", "AS", "PHP", "₱"),
    ("PK", "Pakistan", "AS", "PKR", "₨"),
    ("PL", "Poland", "EU", "PLN", "zł"),
    ("PM", "Saint Pierre and Miquelon", "NA", "EUR", "€"),
    ("PN", "Pitcairn Islands", "OC", "NZD", "$"),
    ("PR", "Puerto Rico", "NA", "USD", "$"),
    ("PS", "Palestine", "AS", "ILS", "₪"),
    ("PT", "Portugal", "EU", "EUR", "€"),
    ("PW", "Palau", "OC", "USD", "$"),
    ("PY", "Paraguay", "SA", "PYG", "₲"),
    ("QA", "Qatar", "AS", "QAR", "ر.ق"),
    ("RE", "Réunion", "AF", "EUR", "€"),
    ("RO", "Romania", "EU", "RON", "lei"),
    ("RS", "Serbia", "EU", "RSD", "дин."),
    ("RU", "Russia", "EU", "RUB", "₽"),
    ("RW", "Rwanda", "AF", "RWF", "FRw"),
    ("SA", "Saudi Arabia", "AS", "SAR", "ر.س"),
    ("SB", "Solomon Islands", "OC", "SBD", "$"),
    ("SC", "Seychelles", "AF", "SCR", "₨"),
    ("SD", "Sudan", "AF", "SDG", "ج.س."),
    ("SE", "Sweden", "EU", "SEK", "kr"),
    ("SG", "Singapore", "AS", "SGD", "$"),
    ("SH", "Saint Helena", "AF", "SHP", "£"),
    ("SI", "Slovenia", "EU", "EUR", "€"),
    ("SJ", "Svalbard and Jan Mayen", "EU", "NOK", "kr"),
    ("SK", "Slovakia", "EU", "EUR", "€"),
    ("SL", "Sierra Leone", "AF", "SLE", "Le"),
    ("SM", "San Marino", "EU", "EUR", "€"),
    ("SN", "Senegal", "AF", "XOF", "CFA"),
    ("SO", "Somalia", "AF", "SOS", "Sh"),
    ("SR", "Suriname", "SA", "SRD", "$"),
    ("SS", "South Sudan", "AF", "SSP", "£"),
    ("ST", "São Tomé and Príncipe", "AF", "STN", "Db"),
    ("SV", "El Salvador", "NA", "USD", "$"),
    ("SX", "Sint Maarten", "NA", "ANG", "ƒ"),
    ("SY", "Syria", "AS", "SYP", "£"),
    ("SZ", "Eswatini", "AF", "SZL", "L"),
    ("TC", "Turks and Caicos Islands", "NA", "USD", "$"),
    ("TD", "Chad", "AF", "XAF", "FCFA"),
    ("TF", "French Southern Territories", "AN", "EUR", "€"),
    ("TG", "Togo", "AF", "XOF", "CFA"),
    ("TH", "Thailand", "AS", "THB", "฿"),
    ("TJ", "Tajikistan", "AS", "TJS", "SM"),
    ("TK", "Tokelau", "OC", "NZD", "$"),
    ("TL", "Timor-Leste", "AS", "USD", "$"),
    ("TM", "Turkmenistan", "AS", "TMT", "m"),
    ("TN", "Tunisia", "AF", "TND", "د.ت"),
    ("TO", "Tonga", "OC", "TOP", "T$"),
    ("TR", "Türkiye", "AS", "TRY", "₺"),
    ("TT", "Trinidad and Tobago", "NA", "TTD", "$"),
    ("TV", "Tuvalu", "OC", "AUD", "$"),
    ("TW", "Taiwan", "AS", "TWD", "NT$"),
    ("TZ", "Tanzania", "AF", "TZS", "TSh"),
    ("UA", "Ukraine", "EU", "UAH", "₴"),
    ("UG", "Uganda", "AF", "UGX", "USh"),
    ("UM", "U.S. Outlying Islands", "OC", "USD", "$"),
    ("US", "United States", "NA", "USD", "$"),
    ("UY", "Uruguay", "SA", "UYU", "$"),
    ("UZ", "Uzbekistan", "AS", "UZS", "soʻm"),
    ("VA", "Vatican City", "EU", "EUR", "€"),
    ("VC", "St Vincent and Grenadines", "NA", "XCD", "$"),
    ("VE", "Venezuela", "SA", "VES", "Bs."),
    ("VG", "British Virgin Islands", "NA", "USD", "$"),
    ("VI", "U.S. Virgin Islands", "NA", "USD", "$"),
    ("VN", "Vietnam", "AS", "VND", "₫"),
    ("VU", "Vanuatu", "OC", "VUV", "Vt"),
    ("WF", "Wallis and Futuna", "OC", "XPF", "₣"),
    ("WS", "Samoa", "OC", "WST", "T"),
    ("XK", "Kosovo", "EU", "EUR", "€"),
    ("YE", "Yemen", "AS", "YER", "﷼"),
    ("YT", "Mayotte", "AF", "EUR", "€"),
    ("ZA", "South Africa", "AF", "ZAR", "R"),
    ("ZM", "Zambia", "AF", "ZMW", "ZK"),
    ("ZW", "Zimbabwe", "AF", "ZWL", "$"),
];

/// Base URL of the flag images, one `<CODE>.svg` per country
pub const FLAG_BASE_URL: &str = "https://cdn.ipinfo.io/static/images/countries-flags/";

fn find(code: &str) -> Option<&'static Row> {
    let code = code.to_ascii_uppercase();
    COUNTRIES
        .binary_search_by(|row| row.0.cmp(code.as_str()))
        .ok()
        .map(|index| &COUNTRIES[index])
}

/// Display name for a country code
///
/// ```
/// use ipinfo_client::countries::country_name;
///
/// assert_eq!(country_name("us"), Some("United States"));
/// assert_eq!(country_name("ZZ"), None);
/// ```
pub fn country_name(code: &str) -> Option<&'static str> {
    find(code).map(|row| row.1)
}

/// Whether a country code belongs to an EU member state
pub fn is_eu(code: &str) -> bool {
    EU_MEMBERS
        .iter()
        .any(|member| member.eq_ignore_ascii_case(code))
}

/// Continent of a country
pub fn continent(code: &str) -> Option<Continent> {
    let row = find(code)?;
    let name = match row.2 {
        "AF" => "Africa",
        "AN" => "Antarctica",
        "AS" => "Asia",
        "EU" => "Europe",
        "NA" => "North America",
        "OC" => "Oceania",
        "SA" => "South America",
        _ => return None,
    };
    Some(Continent {
        code: row.2.to_string(),
        name: name.to_string(),
    })
}

/// Currency used in a country
pub fn currency(code: &str) -> Option<CountryCurrency> {
    find(code).map(|row| CountryCurrency {
        code: row.3.to_string(),
        symbol: row.4.to_string(),
    })
}

/// Flag of a country as an emoji and as its code points
///
/// ```
/// use ipinfo_client::countries::flag;
///
/// let flag = flag("de").unwrap();
/// assert_eq!(flag.emoji, "🇩🇪");
/// assert_eq!(flag.unicode, "U+1F1E9 U+1F1EA");
/// ```
pub fn flag(code: &str) -> Option<CountryFlag> {
    let row = find(code)?;
    let indicators: Vec<char> = row
        .0
        .bytes()
        .filter_map(|letter| char::from_u32(0x1F1E6 + u32::from(letter - b'A')))
        .collect();

    Some(CountryFlag {
        emoji: indicators.iter().collect(),
        unicode: indicators
            .iter()
            .map(|c| format!("U+{:X}", u32::from(*c)))
            .collect::<Vec<_>>()
            .join(" "),
    })
}

/// URL of a country's flag image
pub fn flag_url(code: &str) -> Option<String> {
    find(code).map(|row| format!("{FLAG_BASE_URL}{}.svg", row.0))
}

/// Everything known about a country code, or `None` for unknown codes
pub fn country_info(code: &str) -> Option<CountryInfo> {
    let name = country_name(code)?;
    Some(CountryInfo {
        name: name.to_string(),
        is_eu: is_eu(code),
        flag: flag(code).unwrap_or_default(),
        flag_url: flag_url(code).unwrap_or_default(),
        currency: currency(code).unwrap_or_default(),
        continent: continent(code).unwrap_or_default(),
    })
}
