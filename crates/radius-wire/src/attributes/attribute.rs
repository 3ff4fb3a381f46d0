use crate::packet::PacketError;
use crate::vendor::VendorDictionary;
use std::fmt;
use std::io::Write;

use super::AttributeType;

/// Vendor identity carried by a Vendor-Specific attribute (RFC 2865 Section 5.26)
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |            Vendor-Id
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///      Vendor-Id (cont)           |  Vendor-Type  | Vendor-Length |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    Attribute-Specific ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vsa {
    pub vendor_id: u32,
    pub vendor_type: u8,
}

/// A single RADIUS attribute TLV (RFC 2865 Section 5)
///
/// A plain attribute carries `attr_type` and `value` verbatim. A
/// vendor-specific attribute additionally carries its [`Vsa`] identity;
/// `value` then holds only the vendor payload, with the vendor sub-header
/// reconstructed during encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute type (1 byte)
    pub attr_type: u8,
    /// Attribute value (vendor payload for VSAs)
    pub value: Vec<u8>,
    /// Vendor identity, present only when `attr_type` is Vendor-Specific(26)
    pub vendor: Option<Vsa>,
}

impl Attribute {
    /// Type + length fields (2 bytes)
    pub const HEADER_LENGTH: usize = 2;
    /// Vendor-Id + Vendor-Type + Vendor-Length sub-header (6 bytes)
    pub const VSA_HEADER_LENGTH: usize = 6;
    /// Maximum value length for a plain attribute (255 - 2)
    pub const MAX_VALUE_LENGTH: usize = 253;
    /// Maximum vendor payload length (255 - 2 - 6)
    pub const MAX_VSA_VALUE_LENGTH: usize = 247;

    pub fn new(attr_type: u8, value: Vec<u8>) -> Result<Self, PacketError> {
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(PacketError::Encoding(format!(
                "attribute value too long: {} bytes (max {})",
                value.len(),
                Self::MAX_VALUE_LENGTH
            )));
        }
        Ok(Attribute {
            attr_type,
            value,
            vendor: None,
        })
    }

    /// Create a string attribute
    pub fn string(attr_type: u8, value: impl Into<String>) -> Result<Self, PacketError> {
        Self::new(attr_type, value.into().into_bytes())
    }

    /// Create an integer attribute (32-bit big-endian)
    pub fn integer(attr_type: u8, value: u32) -> Result<Self, PacketError> {
        Self::new(attr_type, value.to_be_bytes().to_vec())
    }

    /// Create an IPv4 address attribute
    pub fn ipv4(attr_type: u8, value: [u8; 4]) -> Result<Self, PacketError> {
        Self::new(attr_type, value.to_vec())
    }

    /// Create a vendor-specific attribute with an explicit vendor identity
    pub fn vsa(vendor_id: u32, vendor_type: u8, value: Vec<u8>) -> Result<Self, PacketError> {
        if value.len() > Self::MAX_VSA_VALUE_LENGTH {
            return Err(PacketError::Encoding(format!(
                "vendor payload too long: {} bytes (max {})",
                value.len(),
                Self::MAX_VSA_VALUE_LENGTH
            )));
        }
        Ok(Attribute {
            attr_type: AttributeType::VendorSpecific.as_u8(),
            value,
            vendor: Some(Vsa {
                vendor_id,
                vendor_type,
            }),
        })
    }

    /// Create a vendor-specific attribute by dictionary name
    ///
    /// The name is resolved against the injected vendor dictionary; fails
    /// with [`PacketError::VsaNotFound`] if it is not registered there.
    pub fn vsa_by_name(
        dictionary: &VendorDictionary,
        name: &str,
        value: Vec<u8>,
    ) -> Result<Self, PacketError> {
        let def = dictionary
            .find_attribute(name)
            .ok_or_else(|| PacketError::VsaNotFound(name.to_string()))?;
        Self::vsa(def.vendor_id, def.vendor_type, value)
    }

    pub fn is_vsa(&self) -> bool {
        self.vendor.is_some()
    }

    /// Encode attribute to its wire TLV, including the VSA sub-header
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let length = self.encoded_length();
        if length > u8::MAX as usize {
            return Err(PacketError::Encoding(format!(
                "encoded attribute too long: {} bytes",
                length
            )));
        }

        let mut buffer = Vec::with_capacity(length);
        buffer.write_all(&[self.attr_type, length as u8])?;
        if let Some(vsa) = self.vendor {
            let vendor_length = self.value.len() + Self::HEADER_LENGTH;
            if vendor_length > u8::MAX as usize {
                return Err(PacketError::Encoding(format!(
                    "vendor payload too long: {} bytes",
                    self.value.len()
                )));
            }
            buffer.write_all(&vsa.vendor_id.to_be_bytes())?;
            buffer.write_all(&[vsa.vendor_type, vendor_length as u8])?;
        }
        buffer.write_all(&self.value)?;

        Ok(buffer)
    }

    /// Wire length of this attribute, including type/length and any VSA sub-header
    pub fn encoded_length(&self) -> usize {
        let vsa_overhead = if self.vendor.is_some() {
            Self::VSA_HEADER_LENGTH
        } else {
            0
        };
        Self::HEADER_LENGTH + vsa_overhead + self.value.len()
    }

    /// Try to interpret value as a string
    pub fn as_string(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.value.clone())
    }

    /// Try to interpret value as an integer (32-bit big-endian)
    pub fn as_integer(&self) -> Result<u32, PacketError> {
        let bytes: [u8; 4] = self.value.as_slice().try_into().map_err(|_| {
            PacketError::Encoding(format!(
                "expected 4 bytes for integer, got {}",
                self.value.len()
            ))
        })?;
        Ok(u32::from_be_bytes(bytes))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vendor {
            Some(vsa) => write!(
                f,
                "Vendor-Specific({}/{}): {:x?}",
                vsa.vendor_id, vsa.vendor_type, self.value
            ),
            None => {
                let name = AttributeType::from_u8(self.attr_type)
                    .map(AttributeType::name)
                    .unwrap_or("Unknown");
                write!(f, "{}({}): {:x?}", name, self.attr_type, self.value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_attribute() {
        let attr = Attribute::string(1, "testuser").unwrap();
        assert_eq!(attr.attr_type, 1);
        assert_eq!(attr.as_string().unwrap(), "testuser");
    }

    #[test]
    fn test_integer_attribute() {
        let attr = Attribute::integer(5, 1234).unwrap();
        assert_eq!(attr.as_integer().unwrap(), 1234);
        assert_eq!(attr.encode().unwrap(), vec![5, 6, 0, 0, 0x04, 0xd2]);
    }

    #[test]
    fn test_plain_attribute_wire_layout() {
        let attr = Attribute::string(18, "OK").unwrap();
        assert_eq!(attr.encode().unwrap(), vec![18, 4, b'O', b'K']);
    }

    #[test]
    fn test_vsa_wire_layout() {
        let attr = Attribute::vsa(9, 1, b"zone=a".to_vec()).unwrap();
        let encoded = attr.encode().unwrap();
        // outer: type 26, length = 2 + 6 + 6
        assert_eq!(&encoded[..2], &[26, 14]);
        // vendor-id big-endian, vendor-type, vendor-length = payload + 2
        assert_eq!(&encoded[2..6], &[0, 0, 0, 9]);
        assert_eq!(&encoded[6..8], &[1, 8]);
        assert_eq!(&encoded[8..], b"zone=a");
    }

    #[test]
    fn test_max_value_length() {
        assert!(Attribute::new(1, vec![0u8; 253]).is_ok());
        assert!(Attribute::new(1, vec![0u8; 254]).is_err());
    }

    #[test]
    fn test_oversized_vsa_payload_rejected() {
        assert!(Attribute::vsa(9, 1, vec![0u8; 247]).is_ok());
        assert!(Attribute::vsa(9, 1, vec![0u8; 248]).is_err());
    }
}
