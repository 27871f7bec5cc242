//! Plain-text end-of-run summary.

use std::fmt::Write;

use agent_runtime::EntityController;

pub fn render(controller: &EntityController) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, controller);
    out
}

fn write_report(out: &mut String, controller: &EntityController) -> std::fmt::Result {
    writeln!(out, "== entities ({}) ==", controller.len())?;
    for entity in controller.entities() {
        let group = entity
            .group
            .map(|group| format!(" group={}", group.0))
            .unwrap_or_default();
        writeln!(
            out,
            "{:<6} {:<10} {:<14} at {}{}{}",
            entity.id.to_string(),
            entity.archetype.to_string(),
            entity.state,
            entity.cell(),
            if entity.is_moving { " (moving)" } else { "" },
            group,
        )?;
    }

    writeln!(out, "== states ==")?;
    for (state, count) in controller.state_counts() {
        writeln!(out, "{state:<14} {count}")?;
    }

    let stats = controller.path_stats();
    writeln!(out, "== paths ==")?;
    writeln!(out, "requested      {}", stats.requested)?;
    writeln!(out, "calculated     {}", stats.calculated)?;
    writeln!(out, "failed         {}", stats.failed)?;
    writeln!(
        out,
        "cache          {} hits / {} misses ({:.1}%)",
        stats.cache_hits, stats.cache_misses, stats.hit_rate
    )?;
    writeln!(out, "avg calc time  {:?}", stats.average_calc_time)?;
    Ok(())
}
