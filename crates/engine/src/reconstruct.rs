//! Stage 3: the layout-preserving reconstruction pass.
//!
//! Runs strictly after the translation map is complete, single
//! threaded; the document model is not safe for concurrent structural
//! edits. For every shape with a translation: capture style, hard-swap
//! text, restore style, apply the group font size, then repair
//! geometry for overcrowded shapes.

use crate::error::EngineError;
use crate::geometry::{self, LayoutBox};
use crate::ratio::visual_width_ratio;
use crate::scale::{self, GroupKey, MIN_FONT_SIZE_PT};
use crate::scheduler::TranslationMap;
use crate::style;
use serde::Serialize;
use slideglot_core::{Alignment, AutoSize, Document, Shape, Slide};
use std::collections::HashMap;

/// Reconstruction tuning knobs. The defaults are the engine policy;
/// they exist as fields so tests can tighten them.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Font sizes never drop below this.
    pub min_font_size_pt: f32,

    /// Group ratios at or below this count as visually unchanged.
    pub untouched_threshold: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            min_font_size_pt: MIN_FONT_SIZE_PT,
            untouched_threshold: 1.05,
        }
    }
}

/// Summary counters reported to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text_units_replaced: usize,
    pub font_reductions: usize,
    pub width_expansions: usize,
    pub word_wrap_enabled: usize,
    pub untouched: usize,
}

/// One translated shape awaiting reconstruction, grouped by its
/// scaling key.
struct Member {
    shape_id: u32,
    translated: String,
    length_ratio: f64,
}

/// Rewrite every shape whose (trimmed) text has a map entry.
///
/// The document is mutated in place; geometry changes only ever come
/// from the expansion step, never incidentally from style restore.
pub fn reconstruct(
    document: &mut Document,
    translation_map: &TranslationMap,
    options: &EngineOptions,
) -> Result<Summary, EngineError> {
    let slide_width = document.slide_width;
    let mut summary = Summary::default();

    for (slide_index, slide) in document.slides.iter_mut().enumerate() {
        // Layout boxes for every shape on this slide, rebuilt from
        // current state. Cross-slide collisions are impossible by
        // construction, so the list is per slide.
        let mut boxes: Vec<LayoutBox> = slide.shapes.iter().map(LayoutBox::from_shape).collect();

        let groups = collect_groups(slide, translation_map);

        for (key, members) in groups {
            let ratios: Vec<f64> = members.iter().map(|m| m.length_ratio).collect();
            let effective_ratio = scale::effective_group_ratio(&ratios);
            let reduction = scale::reduction_ratio(effective_ratio);
            let new_size_pt =
                scale::apply_reduction(key.size_pt(), reduction, options.min_font_size_pt);

            log::debug!(
                "Slide {}: group ({}pt, {:?}, {}) of {} shapes -> reduction {:.3}, size {:.1}pt",
                slide_index + 1,
                key.size_pt(),
                key.alignment,
                key.font,
                members.len(),
                reduction,
                new_size_pt
            );

            for member in members {
                let Some(shape) = slide.shape_by_id_mut(member.shape_id) else {
                    continue;
                };

                // Capture before the swap; the swap resets runs.
                let pinned_frame = shape.frame;
                let record = style::capture(shape);

                shape.set_text(&member.translated);
                style::restore(shape, &record);
                shape.frame = pinned_frame;

                if let Some(tf) = shape.text_frame.as_mut() {
                    // Overflow is accepted; never let the document
                    // shrink or grow the shape on its own.
                    tf.auto_size = Some(AutoSize::None);

                    // Group-shared font size, applied only to runs
                    // that carried an explicit size.
                    for para in &mut tf.paragraphs {
                        for run in &mut para.runs {
                            if run.props.size_pt.is_some() {
                                run.props.size_pt = Some(new_size_pt);
                            }
                        }
                    }
                }

                summary.text_units_replaced += 1;

                let floored = new_size_pt <= options.min_font_size_pt;
                let overcrowded = (floored && member.length_ratio > 1.2)
                    || member.length_ratio > 2.0;

                if overcrowded {
                    let shape_box = LayoutBox::from_shape(shape);
                    match geometry::try_expand(&shape_box, key.alignment, slide_width, &boxes) {
                        Some(expansion) => {
                            geometry::apply_expansion(&mut shape.frame, expansion);
                            // Later expansions must see the new box.
                            if let Some(entry) =
                                boxes.iter_mut().find(|b| b.shape_id == member.shape_id)
                            {
                                entry.left = expansion.left;
                                entry.width = expansion.width;
                            }
                            summary.width_expansions += 1;
                        }
                        None => {
                            // Deterministic fallback, not a failure.
                            if let Some(tf) = shape.text_frame.as_mut() {
                                tf.word_wrap = Some(true);
                            }
                            summary.word_wrap_enabled += 1;
                            log::info!(
                                "Slide {}: expansion blocked for shape {}, enabling word wrap",
                                slide_index + 1,
                                member.shape_id
                            );
                        }
                    }
                } else if effective_ratio <= options.untouched_threshold {
                    summary.untouched += 1;
                } else {
                    summary.font_reductions += 1;
                }
            }
        }
    }

    log::info!(
        "Reconstruction complete: {} replaced, {} font reductions, {} expansions, {} wraps, {} untouched",
        summary.text_units_replaced,
        summary.font_reductions,
        summary.width_expansions,
        summary.word_wrap_enabled,
        summary.untouched
    );

    Ok(summary)
}

/// Cluster the slide's translated shapes into scaling groups keyed by
/// (base font size, dominant alignment, font family).
fn collect_groups(slide: &Slide, translation_map: &TranslationMap) -> Vec<(GroupKey, Vec<Member>)> {
    let mut groups: HashMap<GroupKey, Vec<Member>> = HashMap::new();
    // Insertion order of keys, for deterministic processing.
    let mut order: Vec<GroupKey> = Vec::new();

    for shape in &slide.shapes {
        if !shape.has_text_frame() {
            continue;
        }
        let original = shape.text();
        let original = original.trim();
        let Some(translated) = translation_map.get(original) else {
            continue;
        };

        let key = GroupKey::new(
            base_font_size(shape),
            dominant_alignment(shape),
            first_font_name(shape),
        );

        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(Member {
            shape_id: shape.id,
            translated: translated.clone(),
            length_ratio: visual_width_ratio(original, translated),
        });
    }

    order
        .into_iter()
        .map(|key| {
            let members = groups.remove(&key).unwrap_or_default();
            (key, members)
        })
        .collect()
}

/// Mean of the explicit run sizes; 18pt when nothing is explicit.
fn base_font_size(shape: &Shape) -> f32 {
    let mut sizes = Vec::new();
    if let Some(tf) = &shape.text_frame {
        for para in &tf.paragraphs {
            for run in &para.runs {
                if let Some(size) = run.props.size_pt {
                    sizes.push(size);
                }
            }
        }
    }
    if sizes.is_empty() {
        18.0
    } else {
        sizes.iter().sum::<f32>() / sizes.len() as f32
    }
}

/// Most common explicit paragraph alignment; left when none is set.
fn dominant_alignment(shape: &Shape) -> Alignment {
    let mut counts: HashMap<Alignment, usize> = HashMap::new();
    if let Some(tf) = &shape.text_frame {
        for para in &tf.paragraphs {
            if let Some(alignment) = para.props.alignment {
                *counts.entry(alignment).or_default() += 1;
            }
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(alignment, _)| alignment)
        .unwrap_or(Alignment::Left)
}

/// First explicit run typeface; Arial as the neutral default.
fn first_font_name(shape: &Shape) -> String {
    if let Some(tf) = &shape.text_frame {
        for para in &tf.paragraphs {
            for run in &para.runs {
                if let Some(font) = &run.props.font {
                    return font.clone();
                }
            }
        }
    }
    "Arial".to_string()
}
