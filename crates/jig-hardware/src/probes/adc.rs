//! ADC channel probe.
//!
//! Samples an ADC channel through the [`AdcSampler`] collaborator and
//! compares the millivolt reading against the channel's acceptance band.

use crate::{
    error::{HardwareError, Result},
    traits::{AdcSampler, Probe},
    types::Band,
};
use jig_core::{ProbeReply, RawDeviceId, constants::ABSENT_VALUE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One ADC channel under test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdcChannelConfig {
    /// Sampler channel index.
    pub channel: u8,
    /// Acceptance band in millivolts (strict open interval).
    pub band: Band,
}

/// Probe for the adc group.
pub struct AdcProbe {
    sampler: Arc<dyn AdcSampler>,
    channels: Vec<AdcChannelConfig>,
    baseline: Vec<Option<i32>>,
}

impl AdcProbe {
    pub fn new(sampler: Arc<dyn AdcSampler>, channels: Vec<AdcChannelConfig>) -> Self {
        let baseline = vec![None; channels.len()];
        AdcProbe {
            sampler,
            channels,
            baseline,
        }
    }

    fn reply_for(&self, cfg: AdcChannelConfig) -> ProbeReply {
        match self.sampler.sample_mv(cfg.channel) {
            Ok(mv) if cfg.band.contains(mv) => ProbeReply::pass_int(mv),
            Ok(mv) => ProbeReply::fail_int(mv),
            Err(HardwareError::Absent { .. }) => ProbeReply::fail_text(ABSENT_VALUE),
            Err(_) => ProbeReply::fail_int(0),
        }
    }
}

impl Probe for AdcProbe {
    async fn init(&mut self) -> Result<()> {
        for (i, cfg) in self.channels.iter().enumerate() {
            self.baseline[i] = self.sampler.sample_mv(cfg.channel).ok();
        }
        debug!(channels = self.channels.len(), baseline = ?self.baseline, "adc group ready");
        Ok(())
    }

    async fn check(&mut self, raw: RawDeviceId) -> ProbeReply {
        let addr = raw.decompose();
        match self.channels.get(addr.base as usize) {
            Some(cfg) => self.reply_for(*cfg),
            None => ProbeReply::fail_int(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAdcSampler;
    use jig_core::{ProbeStatus, ReplyValue};

    fn probe_with(channel: u8, max: i32, min: i32) -> (AdcProbe, Arc<MockAdcSampler>) {
        let sampler = Arc::new(MockAdcSampler::new());
        let probe = AdcProbe::new(
            sampler.clone(),
            vec![AdcChannelConfig {
                channel,
                band: Band::new(max, min),
            }],
        );
        (probe, sampler)
    }

    #[tokio::test]
    async fn in_band_sample_passes() {
        let (mut probe, sampler) = probe_with(3, 1400, 1340);
        sampler.set_mv(3, 1358);

        let reply = probe.check(RawDeviceId::new(0).unwrap()).await;
        assert_eq!(reply, ProbeReply::pass_int(1358));
    }

    #[tokio::test]
    async fn out_of_band_sample_fails() {
        let (mut probe, sampler) = probe_with(3, 1400, 1340);
        sampler.set_mv(3, 900);

        let reply = probe.check(RawDeviceId::new(0).unwrap()).await;
        assert_eq!(reply, ProbeReply::fail_int(900));
    }

    #[tokio::test]
    async fn boundary_equal_sample_fails() {
        let (mut probe, sampler) = probe_with(3, 1400, 1340);

        sampler.set_mv(3, 1400);
        let reply = probe.check(RawDeviceId::new(0).unwrap()).await;
        assert_eq!(reply.status, ProbeStatus::Fail);

        sampler.set_mv(3, 1340);
        let reply = probe.check(RawDeviceId::new(0).unwrap()).await;
        assert_eq!(reply.status, ProbeStatus::Fail);
    }

    #[tokio::test]
    async fn missing_channel_reports_absent() {
        let (mut probe, _sampler) = probe_with(3, 1400, 1340);

        let reply = probe.check(RawDeviceId::new(0).unwrap()).await;
        assert_eq!(reply.status, ProbeStatus::Fail);
        assert_eq!(reply.value, ReplyValue::Text("absent".to_string()));
    }

    #[tokio::test]
    async fn unknown_base_fails() {
        let (mut probe, sampler) = probe_with(3, 1400, 1340);
        sampler.set_mv(3, 1358);

        // base 5 has no configured channel
        let reply = probe.check(RawDeviceId::new(5).unwrap()).await;
        assert_eq!(reply, ProbeReply::fail_int(0));
    }

    #[tokio::test]
    async fn init_takes_baseline() {
        let (mut probe, sampler) = probe_with(3, 1400, 1340);
        sampler.set_mv(3, 1360);
        probe.init().await.unwrap();
        assert_eq!(probe.baseline, vec![Some(1360)]);
    }
}
