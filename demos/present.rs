use alpha_surface::{
    AlphaLayout, BorrowedPixelBuffer, DisplaySurface, PixelFormat, Presentation, Size,
    SoftwareSurface, SurfaceConfig, TintParams,
};

/// Build a side-by-side BGRA frame: a radial mask on the left, a colour
/// gradient on the right.
fn synthetic_frame(width: u32, height: u32) -> Vec<u8> {
    let half = width / 2;
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            if x < half {
                let dx = x as f32 / half as f32 - 0.5;
                let dy = y as f32 / height as f32 - 0.5;
                let coverage = (1.0 - (dx * dx + dy * dy).sqrt() * 2.0).clamp(0.0, 1.0);
                let m = (coverage * 255.0) as u8;
                data.extend_from_slice(&[m, m, m, 255]);
            } else {
                let r = ((x - half) * 255 / half.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                data.extend_from_slice(&[128, g, r, 255]);
            }
        }
    }
    data
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "overlay.png".into());
    let tinted = args.next().as_deref() == Some("--tint");

    let mut config = SurfaceConfig::default().with_layout(AlphaLayout::AlphaLeftColorRight);
    if tinted {
        config = config.with_tint(TintParams::default());
    }
    let mut surface =
        SoftwareSurface::new(Size::new(480, 320), config).expect("view fits the canvas limit");

    let (width, height) = (256, 192);
    let data = synthetic_frame(width, height);
    let buffer = BorrowedPixelBuffer::packed(
        PixelFormat::Bgra32,
        Size::new(width, height),
        &data,
        width as usize * 4,
    );
    surface
        .display_frame(&buffer)
        .expect("synthetic frame is valid");

    match surface.redraw() {
        Presentation::Frame { first } => println!("drew frame (first: {first})"),
        Presentation::Cleared => println!("nothing to draw"),
    }

    surface
        .canvas()
        .save(&output)
        .expect("failed to write png");
    println!("wrote {output}");
}
