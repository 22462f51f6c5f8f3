use crate::resolution::Resolution;

/// Attenuation horizon for the query-count boost: two days, squared growth
/// beyond it. The boost is down to roughly 1/16 after eight idle days.
pub const ATTENUATION_HORIZON_SECS: f64 = 172_800.0;

/// Scoring strategy for ranking resolutions. Higher is better, both for the
/// published "best" name and for surviving eviction.
pub trait Heuristic: Send + Sync {
    fn score(&self, resolution: &Resolution, now: f64) -> f64;
}

/// Default heuristic: chain shape sets the base preference, query volume
/// boosts it, and the boost is attenuated by how far the resolution has gone
/// quiet. The trend term keeps an active-then-idle resolution decaying even
/// though no update event fires on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendingHeuristic;

impl Heuristic for TrendingHeuristic {
    fn score(&self, resolution: &Resolution, now: f64) -> f64 {
        let depth = resolution.depth() as f64;
        let labels = resolution.terminal_labels().max(1) as f64;
        let delta_last = (now - resolution.last_seen()).max(0.0);

        let base = depth / labels;
        let boost = (resolution.query_count() as f64).ln();
        let combined = 0.9 * resolution.trend() + 0.1 * delta_last;
        let reach =
            (combined * combined + delta_last * delta_last).sqrt() / ATTENUATION_HORIZON_SECS;
        let attenuator = 1.0 + reach * reach;

        base + boost / attenuator
    }
}

/// Pick the best resolution out of an association's set.
///
/// Reload markers are excluded while any live resolution exists. Ties are
/// broken toward the lexicographically smaller terminal name so selection is
/// deterministic.
pub fn select_best<'a, I>(
    resolutions: I,
    heuristic: &dyn Heuristic,
    now: f64,
) -> Option<&'a Resolution>
where
    I: IntoIterator<Item = &'a Resolution>,
{
    let candidates: Vec<&Resolution> = resolutions.into_iter().collect();
    let any_live = candidates.iter().any(|r| !r.is_reloaded());

    let mut best: Option<(&Resolution, f64)> = None;
    for resolution in candidates {
        if any_live && resolution.is_reloaded() {
            continue;
        }
        let score = heuristic.score(resolution, now);
        best = match best {
            None => Some((resolution, score)),
            Some((current, current_score)) => {
                if score > current_score
                    || (score == current_score && resolution.terminal() < current.terminal())
                {
                    Some((resolution, score))
                } else {
                    Some((current, current_score))
                }
            }
        };
    }
    best.map(|(r, _)| r)
}
