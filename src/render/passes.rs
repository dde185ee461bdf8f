use crate::{
    foundation::error::{FrameshotError, FrameshotResult},
    render::backend::FrameRGBA,
    render::plan::{
        CompositePass, OffscreenPass, Pass, RenderPlan, ScenePass, SurfaceDesc, SurfaceId,
    },
};

/// Executes the individual passes of a [`RenderPlan`].
pub trait PassBackend {
    /// Allocate (or reset) surface `id` to `desc`.
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> FrameshotResult<()>;

    /// Draw `pass.ops` over the target surface.
    fn exec_scene(&mut self, pass: &ScenePass) -> FrameshotResult<()>;

    /// Run a filter kernel.
    fn exec_offscreen(&mut self, pass: &OffscreenPass) -> FrameshotResult<()>;

    /// Composite surfaces.
    fn exec_composite(&mut self, pass: &CompositePass) -> FrameshotResult<()>;

    /// Copy out a surface.
    fn readback_rgba8(
        &mut self,
        surface: SurfaceId,
        plan: &RenderPlan,
    ) -> FrameshotResult<FrameRGBA>;
}

/// Run every pass of `plan` on `backend` and read back the final surface.
pub fn execute_plan<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &RenderPlan,
) -> FrameshotResult<FrameRGBA> {
    for (idx, desc) in plan.surfaces.iter().enumerate() {
        let id = SurfaceId(
            idx.try_into()
                .map_err(|_| FrameshotError::render("surface id overflow"))?,
        );
        backend.ensure_surface(id, desc)?;
    }

    for pass in &plan.passes {
        match pass {
            Pass::Scene(p) => backend.exec_scene(p)?,
            Pass::Offscreen(p) => backend.exec_offscreen(p)?,
            Pass::Composite(p) => backend.exec_composite(p)?,
        }
    }

    backend.readback_rgba8(plan.final_surface, plan)
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
