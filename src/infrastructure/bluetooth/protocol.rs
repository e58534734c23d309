//! Roulette Device Protocol
//!
//! The roulette firmware exposes a Nordic-style UART service. The kiosk
//! only ever writes to its RX characteristic; nothing is read back.

use anyhow::Result;

/// UART service advertised by the roulette device
pub const UART_SERVICE_UUID: &str = "6e400001-b5a3-f393-e0a9-e50e24dcca9e";

/// RX characteristic (host → device writes)
pub const UART_RX_CHAR_UUID: &str = "6e400002-b5a3-f393-e0a9-e50e24dcca9e";

/// `UART_SERVICE_UUID` in GATT form
pub const UART_SERVICE: Uuid128 = Uuid128 {
    data1: 0x6e40_0001,
    data2: 0xb5a3,
    data3: 0xf393,
    data4: [0xe0, 0xa9, 0xe5, 0x0e, 0x24, 0xdc, 0xca, 0x9e],
};

/// `UART_RX_CHAR_UUID` in GATT form
pub const UART_RX_CHAR: Uuid128 = Uuid128 {
    data1: 0x6e40_0002,
    ..UART_SERVICE
};

/// Advertised local name prefix, e.g. `ROULETTE-01`
pub const DEVICE_NAME_PREFIX: &str = "ROULETTE-";

/// Build the `START:<token>\n` command frame
pub fn start_frame(token: &str) -> Vec<u8> {
    format!("START:{}\n", token).into_bytes()
}

/// A 128-bit UUID split the way GATT APIs want it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uuid128 {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Parse a hyphenated or bare 32-digit UUID string
pub fn parse_uuid(uuid_str: &str) -> Result<Uuid128> {
    let uuid_str = uuid_str.trim().replace('-', "");

    if uuid_str.len() != 32 || !uuid_str.is_ascii() {
        return Err(anyhow::anyhow!("Invalid UUID format"));
    }

    let data1 = u32::from_str_radix(&uuid_str[0..8], 16)?;
    let data2 = u16::from_str_radix(&uuid_str[8..12], 16)?;
    let data3 = u16::from_str_radix(&uuid_str[12..16], 16)?;

    let mut data4 = [0u8; 8];
    for (i, byte) in data4.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&uuid_str[16 + i * 2..18 + i * 2], 16)?;
    }

    Ok(Uuid128 {
        data1,
        data2,
        data3,
        data4,
    })
}

/// What the device picker should accept
#[derive(Debug, Clone)]
pub struct DeviceFilter {
    pub name_prefix: String,
    pub service_uuid: Uuid128,
}

impl DeviceFilter {
    /// A device matches by advertised name prefix or by advertised service
    pub fn matches(&self, local_name: &str, services: &[Uuid128]) -> bool {
        (!self.name_prefix.is_empty() && local_name.starts_with(&self.name_prefix))
            || services.contains(&self.service_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_frame_bytes() {
        assert_eq!(start_frame("C3"), b"START:C3\n".to_vec());
    }

    #[test]
    fn test_parse_uuid() {
        let uuid = parse_uuid(UART_SERVICE_UUID).unwrap();
        assert_eq!(uuid.data1, 0x6e400001);
        assert_eq!(uuid.data2, 0xb5a3);
        assert_eq!(uuid.data4[7], 0x9e);
        assert!(parse_uuid("6e400001").is_err());
        assert!(parse_uuid("zz400001-b5a3-f393-e0a9-e50e24dcca9e").is_err());
    }

    #[test]
    fn test_stock_uuid_constants_match_strings() {
        assert_eq!(parse_uuid(UART_SERVICE_UUID).unwrap(), UART_SERVICE);
        assert_eq!(parse_uuid(UART_RX_CHAR_UUID).unwrap(), UART_RX_CHAR);
    }

    #[test]
    fn test_filter_matches_name_or_service() {
        let filter = DeviceFilter {
            name_prefix: DEVICE_NAME_PREFIX.to_string(),
            service_uuid: UART_SERVICE,
        };
        assert!(filter.matches("ROULETTE-07", &[]));
        assert!(filter.matches("", &[filter.service_uuid]));
        assert!(!filter.matches("Headphones", &[]));
    }
}
