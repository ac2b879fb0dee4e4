use std::fmt::{Display, Formatter};

use enumflags2::BitFlags;

use crate::interface::adv::{AdFlags, AdvertisingFields};
use crate::DeviceKey;

/// What the scanner has learned about one remote device.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceRecord {
    pub key: DeviceKey,
    pub flags: Option<BitFlags<AdFlags>>,
    pub partial_name: Option<String>,
    pub full_name: Option<String>,
    pub tx_power: Option<i8>,
    pub services: Vec<u16>,
    pub rssi: i8,
}

impl DeviceRecord {
    pub fn new(key: DeviceKey) -> Self {
        DeviceRecord {
            key,
            flags: None,
            partial_name: None,
            full_name: None,
            tx_power: None,
            services: Vec::new(),
            rssi: 0,
        }
    }

    /// Folds in the fields of a new report. Fields the report lacks keep
    /// their previous value.
    pub fn merge(&mut self, fields: AdvertisingFields, rssi: i8) {
        if fields.flags.is_some() {
            self.flags = fields.flags;
        }
        if fields.partial_name.is_some() {
            self.partial_name = fields.partial_name;
        }
        if fields.full_name.is_some() {
            self.full_name = fields.full_name;
        }
        if fields.tx_power.is_some() {
            self.tx_power = fields.tx_power;
        }
        if !fields.uuid16.is_empty() {
            self.services = fields.uuid16;
        }
        self.rssi = rssi;
    }

    pub fn name(&self) -> Option<&str> {
        self.full_name.as_deref().or(self.partial_name.as_deref())
    }
}

impl Display for DeviceRecord {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.key)?;
        if let Some(name) = self.name() {
            write!(f, " \"{}\"", name)?;
        }
        write!(f, " rssi {}", self.rssi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, AddressType};

    #[test]
    pub fn merge_keeps_missing_fields() {
        let key = DeviceKey::new(Address::from_u64(0x0102_0304_0506), AddressType::Random);
        let mut record = DeviceRecord::new(key);
        record.merge(
            AdvertisingFields {
                partial_name: Some("Hi".into()),
                tx_power: Some(-4),
                ..Default::default()
            },
            -70,
        );
        record.merge(
            AdvertisingFields {
                full_name: Some("Hello There".into()),
                ..Default::default()
            },
            -65,
        );

        assert_eq!(record.partial_name.as_deref(), Some("Hi"));
        assert_eq!(record.tx_power, Some(-4));
        assert_eq!(record.name(), Some("Hello There"));
        assert_eq!(record.rssi, -65);
        assert_eq!(
            record.to_string(),
            "01:02:03:04:05:06 (random) \"Hello There\" rssi -65"
        );
    }
}
