//! Export of derived fields.
//!
//! OBJ meshes for the triangulated surface and PNG rasters for elevation,
//! flux, soil and the sink/river masks. Writers take any `std::io::Write`;
//! the `export_*` helpers open a file first.

mod obj;
pub mod palette;
mod png;

pub use obj::{export_obj, mesh_vertices, write_obj};
pub use palette::Palette;
pub use png::{
    export_field_png, export_mask_png, normalize_linear, normalize_log1p,
    write_elevation_png, write_flux_png, write_mask_png, write_soil_png, write_unit_png,
    PngExportOptions, RasterDepth, RasterKind,
};
