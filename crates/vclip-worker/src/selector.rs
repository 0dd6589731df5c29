//! Selector (C3): choose `target_count` non-overlapping clip ranges from a
//! transcript, in three falling-back strategies (LLM, rule-based, hard
//! fallback).

use serde::Deserialize;
use vclip_models::{
    Options, SelectionMethod, SelectionRange, TranscriptSegment, MIN_GUARANTEED,
};

use crate::llm::LlmClient;
use crate::logging::JobLogger;

#[derive(Debug, Deserialize)]
struct LlmRangeResponse {
    start: f64,
    end: f64,
    #[serde(default)]
    #[allow(dead_code)]
    reason: String,
}

/// Run the full fallback chain and return the final ordered, validated
/// ranges. `source_duration` bounds every strategy's output.
pub async fn select(
    segments: &[TranscriptSegment],
    options: &Options,
    source_duration: f64,
    llm: Option<&LlmClient>,
    log: &JobLogger,
) -> Vec<SelectionRange> {
    if !options.force_rule_based && !segments.is_empty() {
        if let Some(client) = llm {
            match try_llm(client, segments, options, source_duration).await {
                Ok(ranges) if ranges.len() >= MIN_GUARANTEED as usize => {
                    log.info(&format!("strategy A produced {} ranges", ranges.len()));
                    return ranges;
                }
                Ok(ranges) => {
                    log.warn(&format!(
                        "strategy A produced only {} of {} ranges, falling through",
                        ranges.len(),
                        options.target_count
                    ));
                }
                Err(e) => {
                    log.warn(&format!("strategy A failed: {e}, falling through to rule-based"));
                }
            }
        }
    }

    let rule_ranges = rule_based(segments, options, source_duration);
    if rule_ranges.len() >= MIN_GUARANTEED {
        log.info(&format!("strategy B produced {} ranges", rule_ranges.len()));
        return rule_ranges;
    }

    log.warn("strategy B produced fewer than the minimum guaranteed, using hard fallback");
    hard_fallback(options, source_duration)
}

/// Strategy A. Builds the prompt, calls the LLM, post-validates the
/// response, and pads any shortfall from Strategy B over the unconsumed
/// transcript so a partial LLM success still counts as A succeeding.
async fn try_llm(
    client: &LlmClient,
    segments: &[TranscriptSegment],
    options: &Options,
    source_duration: f64,
) -> Result<Vec<SelectionRange>, String> {
    let prompt = build_prompt(segments, options);
    let raw = client
        .complete_json(&prompt)
        .await
        .map_err(|e| e.to_string())?;
    let parsed: Vec<LlmRangeResponse> =
        serde_json::from_str(&raw).map_err(|e| format!("invalid JSON from LLM: {e}"))?;

    let candidates: Vec<SelectionRange> = parsed
        .into_iter()
        .map(|r| SelectionRange {
            start: r.start,
            end: r.end,
            method: SelectionMethod::Llm,
        })
        .collect();

    let mut validated = post_validate(candidates, segments, options, source_duration);

    if validated.len() < options.target_count as usize {
        let consumed: Vec<SelectionRange> = validated.clone();
        let remaining_segments: Vec<TranscriptSegment> = segments
            .iter()
            .filter(|s| !consumed.iter().any(|r| r.overlaps(&to_range(s))))
            .cloned()
            .collect();
        let needed = options.target_count as usize - validated.len();
        let padding = rule_based_n(&remaining_segments, options, source_duration, needed)
            .into_iter()
            .map(|mut r| {
                r.method = SelectionMethod::Rule;
                r
            });
        validated.extend(padding);
        validated.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
    }

    Ok(validated)
}

fn to_range(seg: &TranscriptSegment) -> SelectionRange {
    SelectionRange {
        start: seg.start,
        end: seg.end,
        method: SelectionMethod::Llm,
    }
}

fn build_prompt(segments: &[TranscriptSegment], options: &Options) -> String {
    let mut lines = String::new();
    for (i, seg) in segments.iter().enumerate() {
        lines.push_str(&format!(
            "[{i}] {:.2}-{:.2}: {}\n",
            seg.start, seg.end, seg.text
        ));
    }
    format!(
        "You are selecting the most engaging short-form clip candidates from a \
         transcript of spoken language \"{}\".\n\n\
         Transcript segments (index, start-end seconds, text):\n{lines}\n\
         Select exactly {target} non-overlapping time ranges, each between {min} \
         and {max} seconds long, each a concatenation of contiguous transcript \
         segments. Return ONLY a JSON array of objects with fields \"start\" \
         (number, seconds), \"end\" (number, seconds), and \"reason\" (short \
         string). Do not include any other text.",
        options.language,
        target = options.target_count,
        min = options.min_sec,
        max = options.max_sec,
    )
}

/// Post-validation shared by Strategy A's LLM output: drop out-of-range
/// durations *before* snapping (§4.3's documented order — snapping can only
/// move a boundary after the candidate has already earned its spot), then
/// snap to segment boundaries, resolve overlaps keeping the earliest-starting
/// candidate, truncate to `target_count`.
fn post_validate(
    mut candidates: Vec<SelectionRange>,
    segments: &[TranscriptSegment],
    options: &Options,
    source_duration: f64,
) -> Vec<SelectionRange> {
    candidates.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());

    let mut result: Vec<SelectionRange> = Vec::new();
    for mut candidate in candidates {
        candidate.start = candidate.start.max(0.0);
        candidate.end = candidate.end.min(source_duration);
        if candidate.start >= candidate.end {
            continue;
        }

        let raw_duration = candidate.duration();
        if raw_duration < options.min_sec || raw_duration > options.max_sec {
            continue;
        }

        snap_to_segment_boundaries(&mut candidate, segments);

        if result.iter().any(|r: &SelectionRange| r.overlaps(&candidate)) {
            continue;
        }
        result.push(candidate);
    }

    result.truncate(options.target_count as usize);
    result
}

fn snap_to_segment_boundaries(range: &mut SelectionRange, segments: &[TranscriptSegment]) {
    if segments.is_empty() {
        return;
    }
    if let Some(seg) = segments
        .iter()
        .min_by(|a, b| {
            (a.start - range.start)
                .abs()
                .partial_cmp(&(b.start - range.start).abs())
                .unwrap()
        })
    {
        range.start = seg.start;
    }
    if let Some(seg) = segments
        .iter()
        .min_by(|a, b| {
            (a.end - range.end)
                .abs()
                .partial_cmp(&(b.end - range.end).abs())
                .unwrap()
        })
    {
        range.end = seg.end;
    }
}

/// Strategy B: composite scoring plus greedy range construction.
fn rule_based(
    segments: &[TranscriptSegment],
    options: &Options,
    source_duration: f64,
) -> Vec<SelectionRange> {
    rule_based_n(segments, options, source_duration, options.target_count as usize)
}

fn rule_based_n(
    segments: &[TranscriptSegment],
    options: &Options,
    source_duration: f64,
    target_count: usize,
) -> Vec<SelectionRange> {
    if segments.is_empty() || target_count == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| (i, score_segment(seg, source_duration)))
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap()
            .then_with(|| segments[a.0].start.partial_cmp(&segments[b.0].start).unwrap())
    });

    let mut selected: Vec<SelectionRange> = Vec::new();
    for (start_idx, _) in scored {
        if selected.len() >= target_count {
            break;
        }
        let seed = &segments[start_idx];
        if selected.iter().any(|r| r.overlaps(&to_range(seed))) {
            continue;
        }

        let mut end_idx = start_idx;
        let mut duration = seed.duration();
        let mut best_end_idx = if duration >= options.min_sec { Some(end_idx) } else { None };

        while end_idx + 1 < segments.len() {
            let next = &segments[end_idx + 1];
            let candidate_duration = next.end - seed.start;
            if candidate_duration > options.max_sec {
                break;
            }
            end_idx += 1;
            duration = candidate_duration;
            if duration >= options.min_sec {
                best_end_idx = Some(end_idx);
            }
        }

        let Some(end_idx) = best_end_idx else {
            continue;
        };
        let candidate = SelectionRange {
            start: seed.start,
            end: segments[end_idx].end,
            method: SelectionMethod::Rule,
        };
        if selected.iter().any(|r| r.overlaps(&candidate)) {
            continue;
        }
        selected.push(candidate);
    }

    selected.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap()
            .then_with(|| a.duration().partial_cmp(&b.duration()).unwrap())
    });
    selected
}

fn score_segment(segment: &TranscriptSegment, source_duration: f64) -> f64 {
    let length_score = (segment.text.chars().count() as f64 / 80.0).min(1.0);
    let terminal_bonus = if segment.text.trim_end().ends_with(['。', '.', '!', '?', '！', '？']) {
        0.2
    } else {
        0.0
    };
    let cold_open_penalty = if source_duration > 0.0 && segment.start < source_duration * 0.1 {
        -0.3
    } else {
        0.0
    };
    length_score + terminal_bonus + cold_open_penalty
}

/// Strategy C: three evenly spaced ranges, no transcript required.
fn hard_fallback(options: &Options, source_duration: f64) -> Vec<SelectionRange> {
    let duration = options.fallback_duration();
    [0.10, 0.45, 0.80]
        .iter()
        .filter_map(|fraction| {
            let start = (source_duration * fraction).max(0.0);
            let end = (start + duration).min(source_duration);
            if end <= start {
                return None;
            }
            Some(SelectionRange {
                start,
                end,
                method: SelectionMethod::Fallback,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::JobId;
    use vclip_models::TraceId;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    fn logger() -> JobLogger {
        JobLogger::new(&JobId::new(), &TraceId::new())
    }

    #[test]
    fn hard_fallback_produces_three_evenly_spaced_ranges() {
        let options = Options::default();
        let ranges = hard_fallback(&options, 600.0);
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(|r| r.method == SelectionMethod::Fallback));
        assert_eq!(ranges[0].start, 60.0);
    }

    #[test]
    fn rule_based_respects_min_and_max_duration() {
        let options = Options::default();
        let segments = vec![
            seg(0.0, 10.0, "a long opening line that should score decently."),
            seg(10.0, 20.0, "another segment with plenty of words in it."),
            seg(20.0, 30.0, "a third segment continuing the thought."),
            seg(30.0, 40.0, "a fourth closing statement to end things."),
        ];
        let ranges = rule_based(&segments, &options, 200.0);
        for range in &ranges {
            assert!(range.duration() >= options.min_sec - 0.001);
            assert!(range.duration() <= options.max_sec + 0.001);
        }
    }

    #[test]
    fn rule_based_output_is_chronological_and_non_overlapping() {
        let options = Options::default();
        let segments: Vec<TranscriptSegment> = (0..20)
            .map(|i| seg(i as f64 * 5.0, i as f64 * 5.0 + 5.0, "words words words words words."))
            .collect();
        let ranges = rule_based(&segments, &options, 200.0);
        assert!(ranges.windows(2).all(|w| w[0].end <= w[1].start));
    }

    #[tokio::test]
    async fn select_falls_back_to_strategy_c_on_empty_transcript() {
        let options = Options::default();
        let log = logger();
        let ranges = select(&[], &options, 300.0, None, &log).await;
        assert!(ranges.iter().all(|r| r.method == SelectionMethod::Fallback));
    }
}
