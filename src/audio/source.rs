use std::sync::Arc;
use std::time::Duration;

use rodio::Source;

use super::backend::DspParams;
use super::eq::ThreeBand;

/// Samples between two looks at the shared parameters.
const PARAM_POLL_SAMPLES: usize = 256;

/// Wraps a decoded source with the gain stage and the 3-band EQ.
pub struct EqSource<S> {
    inner: S,
    params: Arc<DspParams>,
    filters: ThreeBand,
    channels: u16,
    sample_rate: u32,
    version: Option<u64>,
    volume: f32,
    audible: bool,
    channel: usize,
    until_poll: usize,
}

impl<S> EqSource<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, params: Arc<DspParams>) -> Self {
        let channels = inner.channels();
        let sample_rate = inner.sample_rate();
        let mut source = Self {
            inner,
            params,
            filters: ThreeBand::new(channels as usize),
            channels,
            sample_rate,
            version: None,
            volume: 1.0,
            audible: false,
            channel: 0,
            until_poll: 0,
        };
        source.poll_params();
        source
    }

    fn poll_params(&mut self) {
        self.volume = self.params.volume();
        self.audible = self.params.audible();

        let channels = self.inner.channels();
        let sample_rate = self.inner.sample_rate();
        let version = self.params.version();
        let format_changed = channels != self.channels || sample_rate != self.sample_rate;

        if format_changed {
            self.channels = channels;
            self.sample_rate = sample_rate;
            self.filters = ThreeBand::new(channels as usize);
            self.channel = 0;
        }
        if format_changed || self.version != Some(version) {
            self.filters.configure(sample_rate as f32, self.params.eq());
            self.version = Some(version);
        }
        self.until_poll = PARAM_POLL_SAMPLES;
    }
}

impl<S> Iterator for EqSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        // Only re-read parameters on a frame boundary.
        if self.until_poll == 0 && self.channel == 0 {
            self.poll_params();
        }
        let sample = self.inner.next()?;
        self.until_poll = self.until_poll.saturating_sub(1);

        let channel = self.channel;
        self.channel = (self.channel + 1) % usize::from(self.channels.max(1));

        if !self.audible {
            return Some(0.0);
        }
        Some(self.filters.process(channel, sample * self.volume))
    }
}

impl<S> Source for EqSource<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.inner.try_seek(pos)?;
        self.filters.reset();
        self.channel = 0;
        Ok(())
    }
}
