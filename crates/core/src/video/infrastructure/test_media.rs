//! Generates small media files for adapter tests. Enabled for other crates'
//! tests by the `test-media` feature.

use std::path::Path;

use ffmpeg_next::format::context::Output;
use ffmpeg_next::Rational;

pub struct TestVideo {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
    pub fps: i32,
    pub audio_rate: Option<u32>,
}

impl TestVideo {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            width: 160,
            height: 120,
            fps: 30,
            audio_rate: None,
        }
    }

    pub fn with_audio(mut self) -> Self {
        self.audio_rate = Some(16000);
        self
    }
}

/// Writes an MPEG-4 video whose frame `i` is solid gray `(i * 8) % 256`,
/// plus an optional AAC 440 Hz tone track.
pub fn create_test_video(path: &Path, video: &TestVideo) {
    ffmpeg_next::init().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
    let mut ost = octx.add_stream(Some(codec)).unwrap();
    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();
    encoder_ctx.set_width(video.width);
    encoder_ctx.set_height(video.height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(Rational(1, video.fps));
    encoder_ctx.set_frame_rate(Some(Rational(video.fps, 1)));
    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }
    let mut video_encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new()).unwrap();
    ost.set_parameters(&video_encoder);

    let audio = video.audio_rate.map(|rate| {
        let aac = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC).unwrap();
        let mut ost_audio = octx.add_stream(Some(aac)).unwrap();
        let mut ctx = ffmpeg_next::codec::context::Context::new_with_codec(aac)
            .encoder()
            .audio()
            .unwrap();
        ctx.set_rate(rate as i32);
        ctx.set_channel_layout(ffmpeg_next::ChannelLayout::MONO);
        ctx.set_format(ffmpeg_next::format::Sample::F32(
            ffmpeg_next::format::sample::Type::Planar,
        ));
        if global_header {
            ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let encoder = ctx.open_as(aac).unwrap();
        ost_audio.set_parameters(&encoder);
        (encoder, ost_audio.index(), rate)
    });

    octx.write_header().unwrap();

    let video_tb = octx.stream(0).unwrap().time_base();
    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        ffmpeg_next::format::Pixel::RGB24,
        video.width,
        video.height,
        ffmpeg_next::format::Pixel::YUV420P,
        video.width,
        video.height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .unwrap();

    let num_frames = (video.duration_secs * video.fps as f64).round() as usize;
    for i in 0..num_frames {
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            video.width,
            video.height,
        );
        let value = ((i * 8) % 256) as u8;
        rgb_frame.data_mut(0).fill(value);

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
        yuv_frame.set_pts(Some(i as i64));

        video_encoder.send_frame(&yuv_frame).unwrap();
        drain_video(&mut video_encoder, &mut octx, Rational(1, video.fps), video_tb);
    }
    video_encoder.send_eof().unwrap();
    drain_video(&mut video_encoder, &mut octx, Rational(1, video.fps), video_tb);

    if let Some((mut encoder, index, rate)) = audio {
        encode_tone(&mut encoder, &mut octx, index, rate, video.duration_secs);
    }

    octx.write_trailer().unwrap();
}

fn drain_video(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut Output,
    enc_tb: Rational,
    ost_tb: Rational,
) {
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(enc_tb, ost_tb);
        encoded.write_interleaved(octx).unwrap();
    }
}

fn encode_tone(
    encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    octx: &mut Output,
    stream_idx: usize,
    rate: u32,
    duration_secs: f64,
) {
    let enc_tb = encoder.time_base();
    let ost_tb = octx.stream(stream_idx).unwrap().time_base();
    let frame_size = match encoder.frame_size() as usize {
        0 => 1024,
        n => n,
    };

    let total = (duration_secs * rate as f64) as usize;
    let samples: Vec<f32> = (0..total)
        .map(|i| {
            let t = i as f64 / rate as f64;
            ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5) as f32
        })
        .collect();

    let mut pts = 0i64;
    for chunk in samples.chunks(frame_size) {
        let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            chunk.len(),
            ffmpeg_next::ChannelLayout::MONO,
        );
        frame.set_rate(rate);
        frame.set_pts(Some(pts));
        let src = unsafe { std::slice::from_raw_parts(chunk.as_ptr() as *const u8, chunk.len() * 4) };
        frame.data_mut(0)[..src.len()].copy_from_slice(src);

        encoder.send_frame(&frame).unwrap();
        drain_audio(encoder, octx, stream_idx, enc_tb, ost_tb);
        pts += chunk.len() as i64;
    }
    encoder.send_eof().unwrap();
    drain_audio(encoder, octx, stream_idx, enc_tb, ost_tb);
}

fn drain_audio(
    encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
    octx: &mut Output,
    stream_idx: usize,
    enc_tb: Rational,
    ost_tb: Rational,
) {
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(stream_idx);
        encoded.rescale_ts(enc_tb, ost_tb);
        encoded.write_interleaved(octx).unwrap();
    }
}
