use std::time::Duration;

use crate::otp::DEFAULT_VALIDITY;

/// Runtime settings derived from env.
#[derive(Clone, Debug)]
pub struct OtpConfig {
    pub validity: Duration,
    /// `None` keeps expiry purely lazy (reaped on validate or overwritten on generate).
    pub sweep_interval: Option<Duration>,
    pub bind_addr: String,
    pub port: u16,
    pub frontend_url: Option<String>,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            validity: DEFAULT_VALIDITY,
            sweep_interval: None,
            bind_addr: "0.0.0.0".into(),
            port: 8080,
            frontend_url: None,
        }
    }
}

impl OtpConfig {
    pub fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
        }
        let defaults = Self::default();
        Self {
            validity: parsed("OTP_VALIDITY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.validity),
            sweep_interval: parsed::<u64>("OTP_SWEEP_INTERVAL_SECS")
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed("PORT").unwrap_or(defaults.port),
            frontend_url: std::env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "OTP_VALIDITY_SECS",
        "OTP_SWEEP_INTERVAL_SECS",
        "BIND_ADDR",
        "PORT",
        "FRONTEND_URL",
    ];

    fn clear() {
        for v in VARS {
            std::env::remove_var(v);
        }
    }

    #[test]
    #[serial]
    fn defaults_when_unset() {
        clear();
        let cfg = OtpConfig::from_env();
        assert_eq!(cfg.validity, Duration::from_secs(300));
        assert!(cfg.sweep_interval.is_none());
        assert_eq!(cfg.bind_addr, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert!(cfg.frontend_url.is_none());
    }

    #[test]
    #[serial]
    fn reads_overrides() {
        clear();
        std::env::set_var("OTP_VALIDITY_SECS", "60");
        std::env::set_var("OTP_SWEEP_INTERVAL_SECS", "30");
        std::env::set_var("PORT", "9090");
        let cfg = OtpConfig::from_env();
        assert_eq!(cfg.validity, Duration::from_secs(60));
        assert_eq!(cfg.sweep_interval, Some(Duration::from_secs(30)));
        assert_eq!(cfg.port, 9090);
        clear();
    }

    #[test]
    #[serial]
    fn garbage_falls_back_and_zero_disables_sweep() {
        clear();
        std::env::set_var("OTP_VALIDITY_SECS", "five minutes");
        std::env::set_var("OTP_SWEEP_INTERVAL_SECS", "0");
        std::env::set_var("PORT", "-1");
        let cfg = OtpConfig::from_env();
        assert_eq!(cfg.validity, DEFAULT_VALIDITY);
        assert!(cfg.sweep_interval.is_none());
        assert_eq!(cfg.port, 8080);
        clear();
    }
}
