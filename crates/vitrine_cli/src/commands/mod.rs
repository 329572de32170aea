//! Subcommand implementations

pub mod budget;
pub mod init;
pub mod resolve;
pub mod simulate;
pub mod theme;
pub mod watch;

use clap::Args;
use std::sync::Arc;
use vitrine_core::{CapabilityProvider, StaticCapabilities, SystemCapabilities};

/// Device description shared by the effects commands
#[derive(Args, Debug, Clone, Default)]
pub struct CapsArgs {
    /// Probe the running host instead of using the flags below
    #[arg(long)]
    pub detect: bool,

    /// Treat the device as handheld
    #[arg(long)]
    pub mobile: bool,

    /// Derive the device class from a user-agent string
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Installed memory in GiB (unknown when omitted)
    #[arg(long, value_name = "GB")]
    pub memory: Option<f32>,

    /// Logical core count (unknown when omitted)
    #[arg(long, value_name = "N")]
    pub cores: Option<u32>,

    /// The OS asks for reduced motion
    #[arg(long)]
    pub system_reduced_motion: bool,

    /// The OS prefers a dark appearance
    #[arg(long)]
    pub dark: bool,
}

impl CapsArgs {
    pub fn provider(&self) -> Arc<dyn CapabilityProvider> {
        if self.detect {
            return Arc::new(SystemCapabilities::new());
        }
        let base = match &self.user_agent {
            Some(ua) => StaticCapabilities::from_user_agent(ua),
            None => StaticCapabilities::default(),
        };
        let mobile = base.mobile || self.mobile;
        Arc::new(
            base.with_mobile(mobile)
                .with_memory(self.memory)
                .with_cores(self.cores)
                .with_reduced_motion(self.system_reduced_motion)
                .with_dark(self.dark),
        )
    }
}
