use bitvec::prelude::*;

use super::{returned, ConnectionManager};
use crate::interface::{Command, Event, ReturnParameters};
use crate::pipeline::DEFAULT_PRIORITY;

/// Events the host wants reported: disconnection complete, encryption change,
/// hardware error and LE meta.
const EVENT_MASK: u64 = 0x2000_0000_0000_8090;
/// LE connection complete, advertising report, connection update complete,
/// read remote features complete and long term key request.
const LE_EVENT_MASK: u64 = 0x1F;

impl ConnectionManager {
    /// Resets the controller, records its attributes and enables the events
    /// the other procedures rely on.
    pub fn reset(&mut self) {
        let commands = [
            Command::Reset,
            Command::ReadBdAddr,
            Command::ReadLocalVersionInformation,
            Command::ReadLocalSupportedCommands,
            Command::ReadLocalSupportedFeatures,
            Command::ReadLocalExtendedFeatures { page_number: 1 },
            Command::LeReadLocalSupportedFeatures,
            Command::SetEventMask {
                event_mask: EVENT_MASK,
            },
            Command::WriteLeHostSupported {
                le_supported: true,
                simultaneous_le_host: false,
            },
            Command::LeSetEventMask {
                event_mask: LE_EVENT_MASK,
            },
            Command::LeReadBufferSize,
            Command::ReadBufferSize,
            Command::LeReadWhiteListSize,
            Command::LeReadSupportedStates,
        ];

        for command in commands {
            self.pipeline
                .send_with(command, DEFAULT_PRIORITY, ConnectionManager::store_info);
        }
    }

    fn store_info(&mut self, event: Option<&Event>) {
        let info = &mut self.info;
        match returned(event) {
            Some(ReturnParameters::BdAddr(address)) => {
                info!("controller address {}", address);
                info.address = *address;
            }
            Some(ReturnParameters::LocalVersion {
                hci_version,
                hci_revision,
                lmp_version,
                manufacturer,
                lmp_subversion,
            }) => {
                debug!(
                    "HCI version {} revision {:#06x}, manufacturer {:#06x}",
                    hci_version, hci_revision, manufacturer
                );
                info.hci_version = *hci_version;
                info.hci_revision = *hci_revision;
                info.lmp_version = *lmp_version;
                info.manufacturer = *manufacturer;
                info.lmp_subversion = *lmp_subversion;
            }
            Some(ReturnParameters::SupportedCommands(commands)) => {
                info.supported_commands = BitVec::from_slice(&commands[..]);
            }
            Some(ReturnParameters::LocalFeatures(features)) => info.features = *features,
            Some(ReturnParameters::ExtendedFeatures { features, .. }) => {
                info.extended_features = *features
            }
            Some(ReturnParameters::LeLocalFeatures(features)) => info.le_features = *features,
            Some(ReturnParameters::LeBufferSize { le_length, le_num }) => {
                info.le_buffer_length = *le_length;
                info.le_buffers = *le_num;
            }
            Some(ReturnParameters::BufferSize {
                acl_length,
                sco_length,
                acl_num,
                sco_num,
            }) => {
                info.acl_buffer_length = *acl_length;
                info.sco_buffer_length = *sco_length;
                info.acl_buffers = *acl_num;
                info.sco_buffers = *sco_num;
            }
            Some(ReturnParameters::WhiteListSize(size)) => info.white_list_size = *size,
            Some(ReturnParameters::SupportedStates(states)) => info.supported_states = *states,
            Some(ReturnParameters::TxPower(power)) => info.advertising_tx_power = *power,
            Some(ReturnParameters::LeHostSupported { .. }) | Some(ReturnParameters::None) => {}
            None => {}
        }
    }
}
