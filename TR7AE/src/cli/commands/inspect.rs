//! File inspection

use std::path::Path;

use crate::formats::ContainerInfo;

pub fn execute(path: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let info = ContainerInfo::inspect(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("Format: {} ({} bytes)", info.handler, info.file_size);

    if !info.sections.is_empty() {
        println!();
        println!("=== Sections ({}) ===", info.sections.len());
        for s in &info.sections {
            println!(
                "{:4}: {:?} id {} - {} bytes, {} relocations",
                s.index, s.section_type, s.id, s.size, s.relocations
            );
        }
    }

    for model in &info.models {
        println!();
        println!("=== Model {} ===", model.name);
        println!("Bones: {}", model.bones);
        println!("Vertices: {}", model.vertices);
        println!("Submeshes: {} ({} triangles)", model.submeshes, model.triangles);
        if model.bones_with_hinfo > 0 {
            println!(
                "Hit collision: {} bones, {} spheres, {} boxes, {} markers, {} capsules",
                model.bones_with_hinfo,
                model.hit_spheres,
                model.hit_boxes,
                model.hit_markers,
                model.hit_capsules
            );
        }
        println!("Materials: {}", model.materials.join(", "));
    }

    if !info.textures.is_empty() {
        println!();
        println!("=== Textures ({}) ===", info.textures.len());
        for t in &info.textures {
            println!(
                "{}: {}x{} {:?}, {} mips, {} bytes",
                t.name, t.width, t.height, t.format, t.mip_count, t.data_size
            );
        }
    }

    Ok(())
}
