//! Record Session Demo
//!
//! Runs the whole capture lifecycle against the in-memory host: camera
//! preview, recording, playback with a download link, and optionally an
//! upload to the URL given as the first argument.
//!
//! ```text
//! cargo run --example record_session -- http://localhost:8080/api/upload
//! ```

use camrec::{init_logging, CaptureSession, MockHost, RenderedNode};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging("info");

    println!("🎥 camrec Record Session Demo");
    println!("=============================");

    let upload_url = std::env::args().nth(1);

    let host = MockHost::new()
        .with_container("camera-preview")
        .with_container("video-container")
        .with_chunks(vec![
            vec![0x1a, 0x45, 0xdf, 0xa3],
            vec![0u8; 4096],
            vec![1u8; 2048],
        ]);
    let mut session = CaptureSession::new(host.clone())?;

    println!("\n📷 Starting camera");
    session.start_camera("camera-preview").await?;
    println!("  State: {}", session.state());

    println!("\n⏺  Recording");
    session.start_recording()?;
    println!("  State: {}", session.state());

    let recording = session.stop_recording().await?;
    println!("\n⏹  Recording stopped");
    println!("  Size: {} bytes in {} chunks", recording.size(), recording.chunk_count());
    println!("  Type: {}", recording.mime_type());
    println!("  State: {}", session.state());

    if let Some(nodes) = host.rendered("video-container") {
        for node in nodes {
            match node {
                RenderedNode::Video { source, .. } => println!("  Playback: {:?}", source),
                RenderedNode::Download(link) => {
                    println!("  Link: {} -> {} ({})", link.label, link.href, link.file_name)
                }
            }
        }
    }

    match upload_url {
        Some(url) => {
            println!("\n📤 Uploading to {}", url);
            match session.upload_recording(&url).await {
                Ok(response) => println!("  Server replied {}: {}", response.status, response.body),
                Err(e) => println!("  Upload failed: {}", e),
            }
        }
        None => println!("\n📤 No upload URL given, skipping upload"),
    }

    let usage = session.resource_usage();
    println!(
        "\n📊 Live resources: {} streams, {} recorders, {} object URLs",
        usage.capture_streams, usage.recorders, usage.object_urls
    );

    session.close();
    println!("  After close: {} live resources", session.resource_usage().total());

    println!("\n✨ Demo completed!");
    Ok(())
}
