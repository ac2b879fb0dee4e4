use super::{ConnectionManager, DeviceRecord, TimerRole};
use crate::config::SCAN_CYCLE;
use crate::interface::adv::{self, AdvertisingFields};
use crate::interface::*;
use crate::pipeline::DEFAULT_PRIORITY;
use crate::DeviceKey;

impl ConnectionManager {
    /// Scans in `scan_type` mode for one cycle, recording every advertiser
    /// heard.
    pub fn scan(&mut self, scan_type: ScanType) {
        info!("starting {} scan", scan_type);
        self.scan_type = scan_type;
        self.pipeline.register(
            EventKey::LE_ADVERTISING_REPORT,
            ConnectionManager::got_advertising_report,
        );

        self.pipeline.send(
            Command::LeSetScanParameters(ScanParameters {
                scan_type,
                interval: 0x0180,
                window: 0x0100,
                ..Default::default()
            }),
            DEFAULT_PRIORITY,
        );
        self.pipeline.send(
            Command::LeSetScanEnable {
                enable: true,
                filter_duplicates: scan_type == ScanType::Passive,
            },
            DEFAULT_PRIORITY,
        );

        self.arm(TimerRole::ScanCycle, SCAN_CYCLE);
    }

    /// Disables scanning, then either connects to what was found or scans
    /// again in the other mode.
    pub(super) fn end_scan_cycle(&mut self) {
        let disable = Command::LeSetScanEnable {
            enable: false,
            filter_duplicates: false,
        };

        if self.config.connect_after_scan && !self.found_devices.is_empty() {
            info!(
                "scan done, connecting to {} devices",
                self.found_devices.len()
            );
            self.pipeline.unregister(EventKey::LE_ADVERTISING_REPORT);
            self.pipeline.send_with(disable, DEFAULT_PRIORITY, |manager, _| {
                manager.connect_each()
            });
        } else {
            self.pipeline.send(disable, DEFAULT_PRIORITY);
            self.scan(self.scan_type.toggle());
        }
    }

    fn got_advertising_report(&mut self, event: &Event) {
        let reports = match event {
            Event::LeAdvertisingReport(reports) => reports,
            _ => return,
        };

        for report in reports {
            let key = DeviceKey::new(report.address, report.address_type);
            let fields = adv::parse(report.data.clone()).unwrap_or_else(|err| {
                debug!("bad advertising data from {}: {}", key, err);
                AdvertisingFields::default()
            });

            let record = self
                .found_devices
                .entry(key)
                .or_insert_with(|| {
                    info!("found {}", key);
                    DeviceRecord::new(key)
                });
            record.merge(fields, report.rssi);
            trace!("{}", record);
        }
    }
}
