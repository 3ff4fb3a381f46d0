/// RADIUS Attribute Types as defined in RFC 2865 and RFC 2866
///
/// This is the static dictionary: the set of standard attributes the engine
/// knows by name at compile time. Vendor attributes live in the runtime
/// [`crate::VendorDictionary`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865
    UserPassword = 2,
    /// CHAP-Password (3) - RFC 2865
    ChapPassword = 3,
    /// NAS-IP-Address (4) - RFC 2865
    NasIpAddress = 4,
    /// NAS-Port (5) - RFC 2865
    NasPort = 5,
    /// Service-Type (6) - RFC 2865
    ServiceType = 6,
    /// Framed-Protocol (7) - RFC 2865
    FramedProtocol = 7,
    /// Framed-IP-Address (8) - RFC 2865
    FramedIpAddress = 8,
    /// Framed-IP-Netmask (9) - RFC 2865
    FramedIpNetmask = 9,
    /// Framed-Routing (10) - RFC 2865
    FramedRouting = 10,
    /// Filter-Id (11) - RFC 2865
    FilterId = 11,
    /// Framed-MTU (12) - RFC 2865
    FramedMtu = 12,
    /// Framed-Compression (13) - RFC 2865
    FramedCompression = 13,
    /// Login-IP-Host (14) - RFC 2865
    LoginIpHost = 14,
    /// Login-Service (15) - RFC 2865
    LoginService = 15,
    /// Login-TCP-Port (16) - RFC 2865
    LoginTcpPort = 16,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// Callback-Number (19) - RFC 2865
    CallbackNumber = 19,
    /// Callback-Id (20) - RFC 2865
    CallbackId = 20,
    /// Framed-Route (22) - RFC 2865
    FramedRoute = 22,
    /// Framed-IPX-Network (23) - RFC 2865
    FramedIpxNetwork = 23,
    /// State (24) - RFC 2865
    State = 24,
    /// Class (25) - RFC 2865
    Class = 25,
    /// Vendor-Specific (26) - RFC 2865
    VendorSpecific = 26,
    /// Session-Timeout (27) - RFC 2865
    SessionTimeout = 27,
    /// Idle-Timeout (28) - RFC 2865
    IdleTimeout = 28,
    /// Termination-Action (29) - RFC 2865
    TerminationAction = 29,
    /// Called-Station-Id (30) - RFC 2865
    CalledStationId = 30,
    /// Calling-Station-Id (31) - RFC 2865
    CallingStationId = 31,
    /// NAS-Identifier (32) - RFC 2865
    NasIdentifier = 32,
    /// Proxy-State (33) - RFC 2865
    ProxyState = 33,
    /// Login-LAT-Service (34) - RFC 2865
    LoginLatService = 34,
    /// Login-LAT-Node (35) - RFC 2865
    LoginLatNode = 35,
    /// Login-LAT-Group (36) - RFC 2865
    LoginLatGroup = 36,
    /// Framed-AppleTalk-Link (37) - RFC 2865
    FramedAppleTalkLink = 37,
    /// Framed-AppleTalk-Network (38) - RFC 2865
    FramedAppleTalkNetwork = 38,
    /// Framed-AppleTalk-Zone (39) - RFC 2865
    FramedAppleTalkZone = 39,
    /// Acct-Status-Type (40) - RFC 2866
    AcctStatusType = 40,
    /// Acct-Delay-Time (41) - RFC 2866
    AcctDelayTime = 41,
    /// Acct-Input-Octets (42) - RFC 2866
    AcctInputOctets = 42,
    /// Acct-Output-Octets (43) - RFC 2866
    AcctOutputOctets = 43,
    /// Acct-Session-Id (44) - RFC 2866
    AcctSessionId = 44,
    /// Acct-Authentic (45) - RFC 2866
    AcctAuthentic = 45,
    /// Acct-Session-Time (46) - RFC 2866
    AcctSessionTime = 46,
    /// Acct-Input-Packets (47) - RFC 2866
    AcctInputPackets = 47,
    /// Acct-Output-Packets (48) - RFC 2866
    AcctOutputPackets = 48,
    /// Acct-Terminate-Cause (49) - RFC 2866
    AcctTerminateCause = 49,
    /// Acct-Multi-Session-Id (50) - RFC 2866
    AcctMultiSessionId = 50,
    /// Acct-Link-Count (51) - RFC 2866
    AcctLinkCount = 51,
    /// CHAP-Challenge (60) - RFC 2865
    ChapChallenge = 60,
    /// NAS-Port-Type (61) - RFC 2865
    NasPortType = 61,
    /// Port-Limit (62) - RFC 2865
    PortLimit = 62,
    /// Login-LAT-Port (63) - RFC 2865
    LoginLatPort = 63,
}

macro_rules! attribute_table {
    ($(($variant:ident, $code:literal, $name:literal)),+ $(,)?) => {
        impl AttributeType {
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($code => Some(AttributeType::$variant),)+
                    _ => None,
                }
            }

            /// Resolve a dictionary name (e.g. `"User-Name"`) to its type
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(AttributeType::$variant),)+
                    _ => None,
                }
            }

            /// Dictionary name of this attribute type
            pub fn name(self) -> &'static str {
                match self {
                    $(AttributeType::$variant => $name,)+
                }
            }
        }
    };
}

attribute_table! {
    (UserName, 1, "User-Name"),
    (UserPassword, 2, "User-Password"),
    (ChapPassword, 3, "CHAP-Password"),
    (NasIpAddress, 4, "NAS-IP-Address"),
    (NasPort, 5, "NAS-Port"),
    (ServiceType, 6, "Service-Type"),
    (FramedProtocol, 7, "Framed-Protocol"),
    (FramedIpAddress, 8, "Framed-IP-Address"),
    (FramedIpNetmask, 9, "Framed-IP-Netmask"),
    (FramedRouting, 10, "Framed-Routing"),
    (FilterId, 11, "Filter-Id"),
    (FramedMtu, 12, "Framed-MTU"),
    (FramedCompression, 13, "Framed-Compression"),
    (LoginIpHost, 14, "Login-IP-Host"),
    (LoginService, 15, "Login-Service"),
    (LoginTcpPort, 16, "Login-TCP-Port"),
    (ReplyMessage, 18, "Reply-Message"),
    (CallbackNumber, 19, "Callback-Number"),
    (CallbackId, 20, "Callback-Id"),
    (FramedRoute, 22, "Framed-Route"),
    (FramedIpxNetwork, 23, "Framed-IPX-Network"),
    (State, 24, "State"),
    (Class, 25, "Class"),
    (VendorSpecific, 26, "Vendor-Specific"),
    (SessionTimeout, 27, "Session-Timeout"),
    (IdleTimeout, 28, "Idle-Timeout"),
    (TerminationAction, 29, "Termination-Action"),
    (CalledStationId, 30, "Called-Station-Id"),
    (CallingStationId, 31, "Calling-Station-Id"),
    (NasIdentifier, 32, "NAS-Identifier"),
    (ProxyState, 33, "Proxy-State"),
    (LoginLatService, 34, "Login-LAT-Service"),
    (LoginLatNode, 35, "Login-LAT-Node"),
    (LoginLatGroup, 36, "Login-LAT-Group"),
    (FramedAppleTalkLink, 37, "Framed-AppleTalk-Link"),
    (FramedAppleTalkNetwork, 38, "Framed-AppleTalk-Network"),
    (FramedAppleTalkZone, 39, "Framed-AppleTalk-Zone"),
    (AcctStatusType, 40, "Acct-Status-Type"),
    (AcctDelayTime, 41, "Acct-Delay-Time"),
    (AcctInputOctets, 42, "Acct-Input-Octets"),
    (AcctOutputOctets, 43, "Acct-Output-Octets"),
    (AcctSessionId, 44, "Acct-Session-Id"),
    (AcctAuthentic, 45, "Acct-Authentic"),
    (AcctSessionTime, 46, "Acct-Session-Time"),
    (AcctInputPackets, 47, "Acct-Input-Packets"),
    (AcctOutputPackets, 48, "Acct-Output-Packets"),
    (AcctTerminateCause, 49, "Acct-Terminate-Cause"),
    (AcctMultiSessionId, 50, "Acct-Multi-Session-Id"),
    (AcctLinkCount, 51, "Acct-Link-Count"),
    (ChapChallenge, 60, "CHAP-Challenge"),
    (NasPortType, 61, "NAS-Port-Type"),
    (PortLimit, 62, "Port-Limit"),
    (LoginLatPort, 63, "Login-LAT-Port"),
}

impl AttributeType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Acct-Status-Type values (RFC 2866 Section 5.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctStatusType {
    /// Start (1) - Session has begun
    Start = 1,
    /// Stop (2) - Session has ended
    Stop = 2,
    /// Interim-Update (3) - Periodic update during session
    InterimUpdate = 3,
    /// Accounting-On (7) - NAS is ready
    AccountingOn = 7,
    /// Accounting-Off (8) - NAS is shutting down
    AccountingOff = 8,
}

impl AcctStatusType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctStatusType::Start),
            2 => Some(AcctStatusType::Stop),
            3 => Some(AcctStatusType::InterimUpdate),
            7 => Some(AcctStatusType::AccountingOn),
            8 => Some(AcctStatusType::AccountingOff),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_code_are_bidirectional() {
        for code in 1u8..=63 {
            if let Some(attr) = AttributeType::from_u8(code) {
                assert_eq!(attr.as_u8(), code);
                assert_eq!(AttributeType::from_name(attr.name()), Some(attr));
            }
        }
    }

    #[test]
    fn test_gaps_in_dictionary() {
        // 17, 21, and 52-59 are unassigned in the RFC 2865/2866 set
        assert!(AttributeType::from_u8(17).is_none());
        assert!(AttributeType::from_u8(21).is_none());
        assert!(AttributeType::from_u8(52).is_none());
        assert!(AttributeType::from_u8(59).is_none());
    }

    #[test]
    fn test_unknown_name() {
        assert!(AttributeType::from_name("No-Such-Attribute").is_none());
    }

    #[test]
    fn test_acct_status_type() {
        assert_eq!(AcctStatusType::from_u32(1), Some(AcctStatusType::Start));
        assert_eq!(AcctStatusType::Stop.as_u32(), 2);
        assert!(AcctStatusType::from_u32(4).is_none());
    }
}
