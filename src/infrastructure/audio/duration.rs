use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Playback duration in seconds read from the container metadata of the
/// uploaded bytes. Any probe failure or non-finite result is `None`; the
/// pipeline treats that as zero seconds rather than failing the request.
pub fn probe_duration_seconds(data: &[u8]) -> Option<f64> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;

    let track = probed.format.default_track()?;
    let params = &track.codec_params;

    let seconds = match (params.n_frames, params.time_base, params.sample_rate) {
        (Some(frames), Some(tb), _) => {
            let time = tb.calc_time(frames);
            time.seconds as f64 + time.frac
        }
        (Some(frames), None, Some(rate)) if rate > 0 => frames as f64 / f64::from(rate),
        _ => return None,
    };

    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}
