use super::Code;
use crate::attributes::{Attribute, AttributeType, Vsa};
use crate::auth::{self, CryptoError};
use crate::vendor::VendorDictionary;
use std::fmt;
use std::io::{self, Write};
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("malformed header: datagram is {0} bytes (minimum 20)")]
    MalformedHeader(usize),
    #[error("invalid packet code: {0}")]
    InvalidCode(u8),
    #[error("invalid packet length field: {0}")]
    InvalidLength(usize),
    #[error("attribute length {length} inconsistent with {remaining} remaining bytes")]
    AttributeLength { length: usize, remaining: usize },
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("vendor attribute not found: {0}")]
    VsaNotFound(String),
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// RADIUS packet as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// Attributes keep their wire order and duplicates are preserved; both are
/// significant on re-encode. `peer` is filled in by the transport, never by
/// the codec.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Packet type (1 byte)
    pub code: Code,
    /// Packet identifier for matching requests/responses (1 byte)
    pub identifier: u8,
    /// Request nonce or response digest (16 bytes)
    pub authenticator: [u8; 16],
    /// Ordered attribute list
    pub attributes: Vec<Attribute>,
    /// Originating peer address, set by the transport
    pub peer: Option<SocketAddr>,
}

impl Packet {
    /// Minimum RADIUS packet size (1 code + 1 id + 2 length + 16 authenticator)
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size per RFC 2865
    pub const MAX_PACKET_SIZE: usize = 4096;

    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Packet {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
            peer: None,
        }
    }

    /// Build a response shell for this request: header copied, attributes
    /// empty, code left for the policy chain to set
    pub fn response_shell(&self) -> Self {
        Packet {
            code: self.code,
            identifier: self.identifier,
            authenticator: self.authenticator,
            attributes: Vec::new(),
            peer: self.peer,
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Add a standard attribute by dictionary name
    ///
    /// Fails with [`PacketError::UnknownAttribute`] when the name is not in
    /// the static dictionary; the packet is left unchanged so construction
    /// can continue without the attribute.
    pub fn add_attribute_by_name(&mut self, name: &str, value: Vec<u8>) -> Result<(), PacketError> {
        let attr_type = AttributeType::from_name(name)
            .ok_or_else(|| PacketError::UnknownAttribute(name.to_string()))?;
        self.add_attribute(Attribute::new(attr_type.as_u8(), value)?);
        Ok(())
    }

    /// Add a vendor-specific attribute by name, resolved through the
    /// injected vendor dictionary
    pub fn add_vsa(
        &mut self,
        dictionary: &VendorDictionary,
        name: &str,
        value: Vec<u8>,
    ) -> Result<(), PacketError> {
        let attr = Attribute::vsa_by_name(dictionary, name, value)?;
        self.add_attribute(attr);
        Ok(())
    }

    /// Find first attribute by numeric type code
    pub fn find_attribute(&self, attr_type: u8) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type == attr_type)
    }

    /// Find all attributes by numeric type code
    pub fn find_all_attributes(&self, attr_type: u8) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.attr_type == attr_type)
            .collect()
    }

    /// All values for a named attribute, in wire order
    ///
    /// Standard names resolve through the static dictionary; anything else is
    /// looked up in the vendor dictionary when one is supplied.
    pub fn attribute_values<'a>(
        &'a self,
        name: &str,
        vendors: Option<&VendorDictionary>,
    ) -> Vec<&'a [u8]> {
        if let Some(attr_type) = AttributeType::from_name(name) {
            return self
                .attributes
                .iter()
                .filter(|a| a.attr_type == attr_type.as_u8())
                .map(|a| a.value.as_slice())
                .collect();
        }

        let Some(def) = vendors.and_then(|d| d.find_attribute(name)) else {
            return Vec::new();
        };
        self.attributes
            .iter()
            .filter(|a| {
                a.vendor
                    == Some(Vsa {
                        vendor_id: def.vendor_id,
                        vendor_type: def.vendor_type,
                    })
            })
            .map(|a| a.value.as_slice())
            .collect()
    }

    /// First value for a named attribute
    pub fn first_attribute<'a>(
        &'a self,
        name: &str,
        vendors: Option<&VendorDictionary>,
    ) -> Option<&'a [u8]> {
        self.attribute_values(name, vendors).into_iter().next()
    }

    /// First value for a named attribute, interpreted as UTF-8
    pub fn first_attribute_string(
        &self,
        name: &str,
        vendors: Option<&VendorDictionary>,
    ) -> Option<String> {
        self.first_attribute(name, vendors)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    /// Encode the packet to its wire datagram
    ///
    /// Attributes are serialized first so the header length field reflects
    /// the complete datagram; User-Password values are obfuscated with the
    /// current header authenticator on the way out. Authenticator digests are
    /// a separate step ([`crate::auth`]) because their timing depends on the
    /// packet direction.
    pub fn encode(&self, secret: &[u8]) -> Result<Vec<u8>, PacketError> {
        let mut buffer = Vec::with_capacity(Self::MIN_PACKET_SIZE);
        buffer.write_all(&[self.code.as_u8(), self.identifier, 0, 0])?;
        buffer.write_all(&self.authenticator)?;

        for attr in &self.attributes {
            if attr.attr_type == AttributeType::UserPassword.as_u8() && !attr.is_vsa() {
                let encrypted = auth::encrypt_password(secret, &self.authenticator, &attr.value)?;
                let length = encrypted.len() + Attribute::HEADER_LENGTH;
                if length > u8::MAX as usize {
                    return Err(PacketError::Encoding(format!(
                        "obfuscated password too long: {} bytes",
                        encrypted.len()
                    )));
                }
                buffer.write_all(&[attr.attr_type, length as u8])?;
                buffer.write_all(&encrypted)?;
            } else {
                buffer.write_all(&attr.encode()?)?;
            }
        }

        let total = buffer.len();
        if total > Self::MAX_PACKET_SIZE {
            return Err(PacketError::Encoding(format!(
                "packet too large: {} bytes",
                total
            )));
        }
        buffer[2..4].copy_from_slice(&(total as u16).to_be_bytes());

        Ok(buffer)
    }

    /// Decode a wire datagram
    ///
    /// The shared secret is needed up front because User-Password attributes
    /// are deobfuscated during the attribute walk, keyed by the request
    /// authenticator read from this same header.
    pub fn decode(data: &[u8], secret: &[u8]) -> Result<Self, PacketError> {
        if data.len() < Self::MIN_PACKET_SIZE {
            return Err(PacketError::MalformedHeader(data.len()));
        }

        let code = Code::from_u8(data[0]).ok_or(PacketError::InvalidCode(data[0]))?;
        let identifier = data[1];
        let length = u16::from_be_bytes([data[2], data[3]]) as usize;

        if length < Self::MIN_PACKET_SIZE || length > Self::MAX_PACKET_SIZE || length > data.len() {
            return Err(PacketError::InvalidLength(length));
        }

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..20]);

        let mut attributes = Vec::new();
        let mut rest = &data[Self::MIN_PACKET_SIZE..length];

        while !rest.is_empty() {
            // A zero type byte terminates the attribute stream. Historical
            // quirk carried for compatibility with peers padding datagrams.
            if rest[0] == 0 {
                break;
            }
            if rest.len() < Attribute::HEADER_LENGTH {
                return Err(PacketError::AttributeLength {
                    length: Attribute::HEADER_LENGTH,
                    remaining: rest.len(),
                });
            }

            let attr_type = rest[0];
            let attr_length = rest[1] as usize;
            if attr_length < Attribute::HEADER_LENGTH || attr_length > rest.len() {
                return Err(PacketError::AttributeLength {
                    length: attr_length,
                    remaining: rest.len(),
                });
            }
            let value = &rest[Attribute::HEADER_LENGTH..attr_length];

            let attribute = if attr_type == AttributeType::UserPassword.as_u8() {
                let plaintext = auth::decrypt_password(secret, &authenticator, value)?;
                Attribute {
                    attr_type,
                    value: plaintext,
                    vendor: None,
                }
            } else if attr_type == AttributeType::VendorSpecific.as_u8() {
                Self::decode_vsa(value)?
            } else {
                Attribute {
                    attr_type,
                    value: value.to_vec(),
                    vendor: None,
                }
            };

            attributes.push(attribute);
            rest = &rest[attr_length..];
        }

        Ok(Packet {
            code,
            identifier,
            authenticator,
            attributes,
            peer: None,
        })
    }

    /// Parse the nested vendor sub-header from a Vendor-Specific value
    fn decode_vsa(value: &[u8]) -> Result<Attribute, PacketError> {
        if value.len() < Attribute::VSA_HEADER_LENGTH {
            return Err(PacketError::AttributeLength {
                length: Attribute::VSA_HEADER_LENGTH,
                remaining: value.len(),
            });
        }

        let vendor_id = u32::from_be_bytes([value[0], value[1], value[2], value[3]]);
        let vendor_type = value[4];
        let vendor_length = value[5] as usize;

        if vendor_length < Attribute::HEADER_LENGTH
            || Attribute::VSA_HEADER_LENGTH + (vendor_length - Attribute::HEADER_LENGTH)
                > value.len()
        {
            return Err(PacketError::AttributeLength {
                length: vendor_length,
                remaining: value.len() - Attribute::VSA_HEADER_LENGTH,
            });
        }

        let payload_end =
            Attribute::VSA_HEADER_LENGTH + vendor_length - Attribute::HEADER_LENGTH;
        Ok(Attribute {
            attr_type: AttributeType::VendorSpecific.as_u8(),
            value: value[Attribute::VSA_HEADER_LENGTH..payload_end].to_vec(),
            vendor: Some(Vsa {
                vendor_id,
                vendor_type,
            }),
        })
    }

    /// Wire length of the encoded packet
    pub fn length(&self) -> usize {
        let mut len = Self::MIN_PACKET_SIZE;
        for attr in &self.attributes {
            len += attr.encoded_length();
        }
        len
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id={} len={} authenticator={:02x?}",
            self.code,
            self.identifier,
            self.length(),
            self.authenticator
        )
    }
}
