use std::time::Duration;

use flowcam::display::{CancelToken, Display, DisplayError, Panel};

/// Shows the panels in a rerun viewer, one `frame` timeline step per iteration.
pub struct RerunDisplay {
    rec: rerun::RecordingStream,
    cancel: CancelToken,
    frame: i64,
}

impl RerunDisplay {
    /// Spawn a viewer and start recording.
    pub fn spawn(app_id: &str, cancel: CancelToken) -> Result<Self, rerun::RecordingStreamError> {
        let rec = rerun::RecordingStreamBuilder::new(app_id).spawn()?;
        rec.set_time_sequence("frame", 0);
        Ok(Self {
            rec,
            cancel,
            frame: 0,
        })
    }
}

impl Display for RerunDisplay {
    fn show(&mut self, name: &str, panel: Panel<'_>) -> Result<(), DisplayError> {
        let color_model = match panel {
            Panel::Gray(_) => rerun::ColorModel::L,
            Panel::Bgr(_) => rerun::ColorModel::BGR,
            Panel::Bgra(_) => rerun::ColorModel::BGRA,
        };
        let size = panel.size();

        self.rec
            .log(
                name.replace(' ', "_"),
                &rerun::Image::from_elements(panel.as_bytes(), size.into(), color_model),
            )
            .map_err(|e| DisplayError(e.to_string()))
    }

    fn wait_for_cancel(&mut self, timeout: Duration) -> bool {
        if !self.cancel.is_cancelled() && !timeout.is_zero() {
            std::thread::sleep(timeout);
        }
        self.frame += 1;
        self.rec.set_time_sequence("frame", self.frame);
        self.cancel.is_cancelled()
    }
}
