use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Barcode symbology known to the decoding engine.
///
/// The discriminant is the stable identity persisted in caller configuration and
/// wire messages; never reorder these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SymbologyKind {
    /// Aztec (full range)
    Aztec = 0,
    /// Aztec compact
    AztecCompact = 1,
    /// QR Code (Model 2)
    QR = 2,
    /// Micro QR
    QRMicro = 3,
    /// Code 128
    Code128 = 4,
    /// Code 93
    Code93 = 5,
    /// Code 39
    Code39 = 6,
    /// Codabar
    Codabar = 7,
    /// Code 11
    Code11 = 8,
    /// MSI Plessey
    Msi = 9,
    /// UPC-A
    UpcA = 10,
    /// UPC-E
    UpcE = 11,
    /// UPC-E1
    UpcE1 = 12,
    /// EAN-13
    Ean13 = 13,
    /// EAN-8
    Ean8 = 14,
    /// PDF417
    PDF417 = 15,
    /// MicroPDF417
    PDF417Micro = 16,
    /// Data Matrix
    Datamatrix = 17,
    /// Standard (industrial) 2 of 5
    Code25 = 18,
    /// Interleaved 2 of 5
    Interleaved25 = 19,
    /// ITF-14
    ITF14 = 20,
    /// IATA 2 of 5
    IATA25 = 21,
    /// Matrix 2 of 5
    Matrix25 = 22,
    /// Datalogic 2 of 5
    Datalogic25 = 23,
    /// COOP 2 of 5
    COOP25 = 24,
    /// Code 32 (Italian pharmacode)
    Code32 = 25,
    /// Telepen
    Telepen = 26,
    /// DotCode
    Dotcode = 27,
    /// Identity document (container for the sub-fields below)
    IDDocument = 28,
    /// Machine readable zone of an identity document (result only)
    IDMRZ = 29,
    /// Portrait picture of an identity document (result only)
    IDPicture = 30,
    /// Signature of an identity document (result only)
    IDSignature = 31,
    /// GS1 DataBar Omnidirectional
    Databar14 = 32,
    /// GS1 DataBar Limited
    DatabarLimited = 33,
    /// GS1 DataBar Expanded
    DatabarExpanded = 34,
    /// USPS Intelligent Mail
    PostalIMB = 35,
    /// USPS Postnet
    Postnet = 36,
    /// USPS Planet
    Planet = 37,
    /// Australia Post 4-state
    AustralianPost = 38,
    /// Royal Mail 4-state (RM4SCC)
    RoyalMail = 39,
    /// PostNL KIX
    KIX = 40,
    /// Japan Post 4-state
    JapanesePost = 41,
    /// MaxiCode
    MaxiCode = 42,
}

/// Broad barcode family a symbology belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbologyFamily {
    /// 2D matrix and stacked codes (QR, Aztec, Data Matrix, PDF417, ...)
    Matrix2D,
    /// Linear 1D codes
    Linear,
    /// 2-of-5 family
    TwoOfFive,
    /// GS1 DataBar family
    DataBar,
    /// 4-state and height-modulated postal codes
    Postal,
    /// Identity document and its sub-fields
    IdDocument,
}

impl SymbologyKind {
    /// Every kind, in id order
    pub const ALL: [SymbologyKind; 43] = [
        SymbologyKind::Aztec,
        SymbologyKind::AztecCompact,
        SymbologyKind::QR,
        SymbologyKind::QRMicro,
        SymbologyKind::Code128,
        SymbologyKind::Code93,
        SymbologyKind::Code39,
        SymbologyKind::Codabar,
        SymbologyKind::Code11,
        SymbologyKind::Msi,
        SymbologyKind::UpcA,
        SymbologyKind::UpcE,
        SymbologyKind::UpcE1,
        SymbologyKind::Ean13,
        SymbologyKind::Ean8,
        SymbologyKind::PDF417,
        SymbologyKind::PDF417Micro,
        SymbologyKind::Datamatrix,
        SymbologyKind::Code25,
        SymbologyKind::Interleaved25,
        SymbologyKind::ITF14,
        SymbologyKind::IATA25,
        SymbologyKind::Matrix25,
        SymbologyKind::Datalogic25,
        SymbologyKind::COOP25,
        SymbologyKind::Code32,
        SymbologyKind::Telepen,
        SymbologyKind::Dotcode,
        SymbologyKind::IDDocument,
        SymbologyKind::IDMRZ,
        SymbologyKind::IDPicture,
        SymbologyKind::IDSignature,
        SymbologyKind::Databar14,
        SymbologyKind::DatabarLimited,
        SymbologyKind::DatabarExpanded,
        SymbologyKind::PostalIMB,
        SymbologyKind::Postnet,
        SymbologyKind::Planet,
        SymbologyKind::AustralianPost,
        SymbologyKind::RoyalMail,
        SymbologyKind::KIX,
        SymbologyKind::JapanesePost,
        SymbologyKind::MaxiCode,
    ];

    /// Stable integer identity
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a kind by its stable id
    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Whether the engine has a decoder for this kind.
    ///
    /// Identity-document sub-fields only ever appear in results.
    pub fn is_decoder(self) -> bool {
        !matches!(
            self,
            SymbologyKind::IDMRZ | SymbologyKind::IDPicture | SymbologyKind::IDSignature
        )
    }

    /// Engine decoder id (0..=39), `None` for result-only kinds
    pub fn decoder_id(self) -> Option<u8> {
        let id = self.id();
        match self {
            SymbologyKind::IDMRZ | SymbologyKind::IDPicture | SymbologyKind::IDSignature => None,
            _ if id > SymbologyKind::IDSignature.id() => Some(id - 3),
            _ => Some(id),
        }
    }

    /// Look up a kind by its engine decoder id
    pub fn from_decoder_id(decoder_id: i32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.decoder_id().map(i32::from) == Some(decoder_id))
    }

    /// Canonical human-readable type name, as reported in decode results
    pub fn type_name(self) -> &'static str {
        match self {
            SymbologyKind::Aztec => "Aztec",
            SymbologyKind::AztecCompact => "Aztec Compact",
            SymbologyKind::QR => "QR",
            SymbologyKind::QRMicro => "QR Micro",
            SymbologyKind::Code128 => "Code 128",
            SymbologyKind::Code93 => "Code 93",
            SymbologyKind::Code39 => "Code 39",
            SymbologyKind::Codabar => "Codabar",
            SymbologyKind::Code11 => "Code 11",
            SymbologyKind::Msi => "MSI",
            SymbologyKind::UpcA => "Upc-A",
            SymbologyKind::UpcE => "Upc-E",
            SymbologyKind::UpcE1 => "Upc-E1",
            SymbologyKind::Ean13 => "Ean-13",
            SymbologyKind::Ean8 => "Ean-8",
            SymbologyKind::PDF417 => "PDF 417",
            SymbologyKind::PDF417Micro => "PDF 417 Micro",
            SymbologyKind::Datamatrix => "Data Matrix",
            SymbologyKind::Code25 => "Code 25",
            SymbologyKind::Interleaved25 => "Interleaved 2 of 5",
            SymbologyKind::ITF14 => "ITF 14",
            SymbologyKind::IATA25 => "IATA 25",
            SymbologyKind::Matrix25 => "Matrix 25",
            SymbologyKind::Datalogic25 => "Datalogic 25",
            SymbologyKind::COOP25 => "COOP 25",
            SymbologyKind::Code32 => "Code 32",
            SymbologyKind::Telepen => "Telepen",
            SymbologyKind::Dotcode => "Dotcode",
            SymbologyKind::IDDocument => "ID Document",
            SymbologyKind::IDMRZ => "MRZ",
            SymbologyKind::IDPicture => "Picture",
            SymbologyKind::IDSignature => "Signature",
            SymbologyKind::Databar14 => "Databar 14",
            SymbologyKind::DatabarLimited => "Databar Limited",
            SymbologyKind::DatabarExpanded => "Databar Expanded",
            SymbologyKind::PostalIMB => "Intelligent Mail",
            SymbologyKind::Postnet => "Postnet",
            SymbologyKind::Planet => "Planet",
            SymbologyKind::AustralianPost => "Australian Post",
            SymbologyKind::RoyalMail => "Royal Mail",
            SymbologyKind::KIX => "PostNL KIX",
            SymbologyKind::JapanesePost => "Japanese Post",
            SymbologyKind::MaxiCode => "MaxiCode",
        }
    }

    /// Identifier spelling of the variant (`"Code128"`, `"UpcE1"`, ...)
    pub fn ident(self) -> &'static str {
        match self {
            SymbologyKind::Aztec => "Aztec",
            SymbologyKind::AztecCompact => "AztecCompact",
            SymbologyKind::QR => "QR",
            SymbologyKind::QRMicro => "QRMicro",
            SymbologyKind::Code128 => "Code128",
            SymbologyKind::Code93 => "Code93",
            SymbologyKind::Code39 => "Code39",
            SymbologyKind::Codabar => "Codabar",
            SymbologyKind::Code11 => "Code11",
            SymbologyKind::Msi => "Msi",
            SymbologyKind::UpcA => "UpcA",
            SymbologyKind::UpcE => "UpcE",
            SymbologyKind::UpcE1 => "UpcE1",
            SymbologyKind::Ean13 => "Ean13",
            SymbologyKind::Ean8 => "Ean8",
            SymbologyKind::PDF417 => "PDF417",
            SymbologyKind::PDF417Micro => "PDF417Micro",
            SymbologyKind::Datamatrix => "Datamatrix",
            SymbologyKind::Code25 => "Code25",
            SymbologyKind::Interleaved25 => "Interleaved25",
            SymbologyKind::ITF14 => "ITF14",
            SymbologyKind::IATA25 => "IATA25",
            SymbologyKind::Matrix25 => "Matrix25",
            SymbologyKind::Datalogic25 => "Datalogic25",
            SymbologyKind::COOP25 => "COOP25",
            SymbologyKind::Code32 => "Code32",
            SymbologyKind::Telepen => "Telepen",
            SymbologyKind::Dotcode => "Dotcode",
            SymbologyKind::IDDocument => "IDDocument",
            SymbologyKind::IDMRZ => "IDMRZ",
            SymbologyKind::IDPicture => "IDPicture",
            SymbologyKind::IDSignature => "IDSignature",
            SymbologyKind::Databar14 => "Databar14",
            SymbologyKind::DatabarLimited => "DatabarLimited",
            SymbologyKind::DatabarExpanded => "DatabarExpanded",
            SymbologyKind::PostalIMB => "PostalIMB",
            SymbologyKind::Postnet => "Postnet",
            SymbologyKind::Planet => "Planet",
            SymbologyKind::AustralianPost => "AustralianPost",
            SymbologyKind::RoyalMail => "RoyalMail",
            SymbologyKind::KIX => "KIX",
            SymbologyKind::JapanesePost => "JapanesePost",
            SymbologyKind::MaxiCode => "MaxiCode",
        }
    }

    /// Family this kind belongs to
    pub fn family(self) -> SymbologyFamily {
        use SymbologyKind::*;
        match self {
            Aztec | AztecCompact | QR | QRMicro | PDF417 | PDF417Micro | Datamatrix
            | Dotcode | MaxiCode => SymbologyFamily::Matrix2D,
            Code128 | Code93 | Code39 | Codabar | Code11 | Msi | UpcA | UpcE | UpcE1 | Ean13
            | Ean8 | Code32 | Telepen => SymbologyFamily::Linear,
            Code25 | Interleaved25 | ITF14 | IATA25 | Matrix25 | Datalogic25 | COOP25 => {
                SymbologyFamily::TwoOfFive
            }
            Databar14 | DatabarLimited | DatabarExpanded => SymbologyFamily::DataBar,
            PostalIMB | Postnet | Planet | AustralianPost | RoyalMail | KIX | JapanesePost => {
                SymbologyFamily::Postal
            }
            IDDocument | IDMRZ | IDPicture | IDSignature => SymbologyFamily::IdDocument,
        }
    }

    /// Resolve an exact canonical type name (`"Code 128"`)
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.type_name() == name)
    }

    /// Resolve a type name or identifier, ignoring case, spaces, `-` and `_`
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|k| normalize(k.type_name()) == wanted || normalize(k.ident()) == wanted)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for SymbologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for SymbologyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::invalid(format!("unknown symbology name '{}'", s)))
    }
}

impl From<SymbologyKind> for u8 {
    fn from(kind: SymbologyKind) -> u8 {
        kind.id()
    }
}

impl TryFrom<u8> for SymbologyKind {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(i32::from(id))
            .ok_or_else(|| Error::invalid(format!("unknown symbology id {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_declaration_order() {
        for (i, kind) in SymbologyKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, i);
            assert_eq!(SymbologyKind::from_id(i as i32), Some(*kind));
        }
        assert_eq!(SymbologyKind::from_id(43), None);
        assert_eq!(SymbologyKind::from_id(-1), None);
    }

    #[test]
    fn test_decoder_ids_skip_id_subfields() {
        assert_eq!(SymbologyKind::IDDocument.decoder_id(), Some(28));
        assert_eq!(SymbologyKind::IDMRZ.decoder_id(), None);
        assert_eq!(SymbologyKind::Databar14.decoder_id(), Some(29));
        assert_eq!(SymbologyKind::MaxiCode.decoder_id(), Some(39));
        assert_eq!(SymbologyKind::from_decoder_id(29), Some(SymbologyKind::Databar14));
        assert_eq!(SymbologyKind::from_decoder_id(40), None);

        let decoders = SymbologyKind::ALL.iter().filter(|k| k.is_decoder()).count();
        assert_eq!(decoders, 40);
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(SymbologyKind::from_type_name("Code 128"), Some(SymbologyKind::Code128));
        assert_eq!(SymbologyKind::from_type_name("code 128"), None);
        assert_eq!(SymbologyKind::from_name("code128"), Some(SymbologyKind::Code128));
        assert_eq!(SymbologyKind::from_name("UPC-E1"), Some(SymbologyKind::UpcE1));
        assert_eq!(SymbologyKind::from_name("interleaved 2 of 5"), Some(SymbologyKind::Interleaved25));
        assert_eq!(SymbologyKind::from_name("Interleaved25"), Some(SymbologyKind::Interleaved25));
        assert_eq!(SymbologyKind::from_name("postnl kix"), Some(SymbologyKind::KIX));
        assert_eq!(SymbologyKind::from_name("Code 129"), None);
        assert_eq!(SymbologyKind::from_name(" - "), None);
        assert!("Hanxin".parse::<SymbologyKind>().is_err());
    }

    #[test]
    fn test_type_names_are_unique() {
        for a in SymbologyKind::ALL {
            for b in SymbologyKind::ALL {
                if a != b {
                    assert_ne!(normalize(a.type_name()), normalize(b.type_name()));
                    assert_ne!(normalize(a.ident()), normalize(b.type_name()));
                }
            }
        }
    }

    #[test]
    fn test_serde_uses_stable_id() {
        let json = serde_json::to_string(&SymbologyKind::Datamatrix).unwrap();
        assert_eq!(json, "17");
        let kind: SymbologyKind = serde_json::from_str("42").unwrap();
        assert_eq!(kind, SymbologyKind::MaxiCode);
        assert!(serde_json::from_str::<SymbologyKind>("43").is_err());
    }

    #[test]
    fn test_family() {
        assert_eq!(SymbologyKind::ITF14.family(), SymbologyFamily::TwoOfFive);
        assert_eq!(SymbologyKind::KIX.family(), SymbologyFamily::Postal);
        assert_eq!(SymbologyKind::IDSignature.family(), SymbologyFamily::IdDocument);
    }
}
