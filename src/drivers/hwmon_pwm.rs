//! PWM fan controller exposed through an hwmon device directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;

use crate::{
    error::{FanError, Result},
    fan_controller::FanController,
    fan_curve::DutyCycle,
};

#[derive(Debug, Clone)]
pub struct HwmonPwmController {
    device: PathBuf,
    channels: Vec<PathBuf>,
}

impl HwmonPwmController {
    /// `channels` are file names inside `device`, e.g. `["pwm1", "pwm2"]`.
    pub fn new<S: AsRef<str>>(device: impl Into<PathBuf>, channels: &[S]) -> Self {
        let device = device.into();
        let channels = channels.iter().map(|c| device.join(c.as_ref())).collect();
        Self { device, channels }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn channels(&self) -> &[PathBuf] {
        &self.channels
    }

    /// Writes the decimal value without a trailing newline.
    ///
    /// The file must already exist; sysfs attributes cannot be created, so a
    /// missing channel is reported instead of silently creating a file.
    async fn write_channel(path: &Path, duty: DutyCycle) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .await?;
        file.write_all(duty.to_string().as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl FanController for HwmonPwmController {
    fn key(&self) -> String {
        self.device.display().to_string()
    }

    async fn apply(&self, duty: DutyCycle) -> Result<()> {
        for channel in &self.channels {
            Self::write_channel(channel, duty)
                .await
                .map_err(|source| FanError::ActuatorWrite {
                    path: channel.clone(),
                    source,
                })?;
            debug!("{} <- {duty}", channel.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn apply_writes_every_channel() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pwm1"), "255\n").unwrap();
        fs::write(dir.path().join("pwm2"), "255\n").unwrap();

        let controller = HwmonPwmController::new(dir.path(), &["pwm1", "pwm2"]);
        controller.apply(95).await.unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("pwm1")).unwrap(), "95");
        assert_eq!(fs::read_to_string(dir.path().join("pwm2")).unwrap(), "95");
    }

    #[tokio::test]
    async fn apply_stops_at_first_missing_channel() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pwm1"), "0").unwrap();
        fs::write(dir.path().join("pwm3"), "0").unwrap();

        let controller = HwmonPwmController::new(dir.path(), &["pwm1", "pwm2", "pwm3"]);
        let err = controller.apply(127).await.unwrap_err();

        match err {
            FanError::ActuatorWrite { path, .. } => assert_eq!(path, dir.path().join("pwm2")),
            other => panic!("Expected ActuatorWrite, got {other:?}"),
        }
        // Partial application: earlier channels keep the new value.
        assert_eq!(fs::read_to_string(dir.path().join("pwm1")).unwrap(), "127");
        assert_eq!(fs::read_to_string(dir.path().join("pwm3")).unwrap(), "0");
        assert!(!dir.path().join("pwm2").exists());
    }

    #[test]
    fn channel_paths_live_under_device() {
        let controller = HwmonPwmController::new("/sys/class/hwmon/hwmon3", &["pwm1", "pwm2"]);
        assert_eq!(
            controller.channels(),
            &[
                PathBuf::from("/sys/class/hwmon/hwmon3/pwm1"),
                PathBuf::from("/sys/class/hwmon/hwmon3/pwm2")
            ]
        );
        assert_eq!(controller.key(), "/sys/class/hwmon/hwmon3");
    }
}
