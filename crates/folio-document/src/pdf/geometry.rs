// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry — where each image lands on its page.
//
// All values are PDF points with the origin at the bottom-left corner.

use folio_core::AppConfig;
use folio_core::types::{PT_PER_MM, PageOrientation, PageSizePolicy};

/// Largest page edge viewers must support (PDF 1.5, Annex C).
pub const MAX_PAGE_PT: f32 = 14_400.0;
/// Smallest page edge viewers must support (PDF 1.5, Annex C).
pub const MIN_PAGE_PT: f32 = 3.0;
/// Smallest drawn image edge; survives rounding to two decimals.
const MIN_DRAW_PT: f32 = 0.01;

/// Page sizing rules shared by every page of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_size: PageSizePolicy,
    pub orientation: PageOrientation,
    /// Blank border around the image, in millimetres.
    pub margin_mm: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PageLayout {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_size: config.page_size,
            orientation: config.orientation,
            margin_mm: config.margin_mm,
        }
    }
}

/// Page size and image placement for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Lower-left corner of the placed image.
    pub image_x: f32,
    pub image_y: f32,
    pub image_width: f32,
    pub image_height: f32,
}

impl PageGeometry {
    /// Compute the geometry for an image of `width` × `height` pixels.
    pub fn compute(layout: &PageLayout, width: u32, height: u32) -> Self {
        let (img_w, img_h) = (width.max(1) as f32, height.max(1) as f32);
        let margin = (layout.margin_mm.max(0.0)) * PT_PER_MM;

        match layout.page_size {
            PageSizePolicy::Fixed(paper) => {
                let (short, long) = paper.dimensions_pt();
                let (short, long) = (clamp_edge(short), clamp_edge(long));
                let landscape = match layout.orientation {
                    PageOrientation::Portrait => false,
                    PageOrientation::Landscape => true,
                    PageOrientation::Auto => img_w > img_h,
                };
                let (page_w, page_h) = if landscape { (long, short) } else { (short, long) };

                // Keep at least one point of drawable area.
                let margin = margin.min((page_w.min(page_h) - 1.0) / 2.0).max(0.0);
                let box_w = page_w - 2.0 * margin;
                let box_h = page_h - 2.0 * margin;

                let scale = (box_w / img_w).min(box_h / img_h);
                let draw_w = (img_w * scale).max(MIN_DRAW_PT);
                let draw_h = (img_h * scale).max(MIN_DRAW_PT);

                Self {
                    page_width: round2(page_w),
                    page_height: round2(page_h),
                    image_x: round2(margin + (box_w - draw_w) / 2.0),
                    image_y: round2(margin + (box_h - draw_h) / 2.0),
                    image_width: round2(draw_w),
                    image_height: round2(draw_h),
                }
            }
            PageSizePolicy::ImageNative { dpi } => {
                let dpi = dpi.max(1) as f32;
                let mut draw_w = img_w * 72.0 / dpi;
                let mut draw_h = img_h * 72.0 / dpi;

                let margin = margin.min(MAX_PAGE_PT / 4.0);
                let limit = MAX_PAGE_PT - 2.0 * margin;
                // Grow tiny pages first, then shrink oversized ones.
                let grow = (MIN_PAGE_PT / draw_w).max(MIN_PAGE_PT / draw_h).max(1.0);
                draw_w *= grow;
                draw_h *= grow;
                let shrink = (limit / draw_w).min(limit / draw_h).min(1.0);
                draw_w = (draw_w * shrink).max(MIN_DRAW_PT);
                draw_h = (draw_h * shrink).max(MIN_DRAW_PT);

                let page_w = clamp_edge(draw_w + 2.0 * margin);
                let page_h = clamp_edge(draw_h + 2.0 * margin);

                Self {
                    page_width: round2(page_w),
                    page_height: round2(page_h),
                    image_x: round2((page_w - draw_w) / 2.0),
                    image_y: round2((page_h - draw_h) / 2.0),
                    image_width: round2(draw_w),
                    image_height: round2(draw_h),
                }
            }
        }
    }
}

fn clamp_edge(points: f32) -> f32 {
    points.clamp(MIN_PAGE_PT, MAX_PAGE_PT)
}

/// Two decimals keep content streams short and stable across platforms.
fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::types::PaperSize;

    fn fixed(orientation: PageOrientation, margin_mm: f32) -> PageLayout {
        PageLayout {
            page_size: PageSizePolicy::Fixed(PaperSize::A4),
            orientation,
            margin_mm,
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.02
    }

    #[test]
    fn landscape_photo_on_portrait_a4_is_width_bound_and_centred() {
        let g = PageGeometry::compute(&fixed(PageOrientation::Portrait, 0.0), 4000, 3000);

        assert!(close(g.page_width, 595.28));
        assert!(close(g.page_height, 841.89));
        assert!(close(g.image_width, 595.28));
        assert!(close(g.image_height, 595.28 * 0.75));
        assert!(close(g.image_x, 0.0));
        assert!(close(g.image_y, (841.89 - 446.46) / 2.0));
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let g = PageGeometry::compute(&fixed(PageOrientation::Portrait, 10.0), 1200, 800);
        let ratio = g.image_width / g.image_height;
        assert!((ratio - 1.5).abs() < 0.01, "ratio {ratio}");
    }

    #[test]
    fn small_images_are_scaled_up() {
        let g = PageGeometry::compute(&fixed(PageOrientation::Portrait, 0.0), 10, 10);
        assert!(close(g.image_width, 595.28));
    }

    #[test]
    fn auto_orientation_turns_page_for_wide_images() {
        let wide = PageGeometry::compute(&fixed(PageOrientation::Auto, 0.0), 300, 200);
        assert!(wide.page_width > wide.page_height);

        let tall = PageGeometry::compute(&fixed(PageOrientation::Auto, 0.0), 200, 300);
        assert!(tall.page_width < tall.page_height);
    }

    #[test]
    fn margins_shrink_the_drawable_box() {
        let g = PageGeometry::compute(&fixed(PageOrientation::Portrait, 20.0), 1000, 1000);
        let margin = 20.0 * PT_PER_MM;
        assert!(close(g.image_x, margin));
        assert!(close(g.image_width, 595.28 - 2.0 * margin));
    }

    #[test]
    fn absurd_margin_still_leaves_room() {
        let g = PageGeometry::compute(&fixed(PageOrientation::Portrait, 10_000.0), 50, 50);
        assert!(g.image_width >= 0.99);
        assert!(g.image_x + g.image_width <= g.page_width + 0.01);
    }

    #[test]
    fn image_native_pages_follow_dpi() {
        let layout = PageLayout {
            page_size: PageSizePolicy::ImageNative { dpi: 144 },
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
        };
        let g = PageGeometry::compute(&layout, 288, 144);
        assert!(close(g.page_width, 144.0));
        assert!(close(g.page_height, 72.0));
        assert!(close(g.image_width, 144.0));
    }

    #[test]
    fn image_native_pages_respect_viewer_limit() {
        let layout = PageLayout {
            page_size: PageSizePolicy::ImageNative { dpi: 72 },
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
        };
        let g = PageGeometry::compute(&layout, 30_000, 15_000);
        assert!(g.page_width <= MAX_PAGE_PT);
        assert!(close(g.page_width / g.page_height, 2.0));
    }

    fn assert_drawable(g: &PageGeometry) {
        assert!(g.page_width >= MIN_PAGE_PT && g.page_width <= MAX_PAGE_PT, "{g:?}");
        assert!(g.page_height >= MIN_PAGE_PT && g.page_height <= MAX_PAGE_PT, "{g:?}");
        assert!(g.image_width > 0.0 && g.image_height > 0.0, "{g:?}");
        assert!(g.image_x + g.image_width <= g.page_width + 0.01, "{g:?}");
        assert!(g.image_y + g.image_height <= g.page_height + 0.01, "{g:?}");
    }

    #[test]
    fn zero_sized_paper_is_raised_to_the_minimum() {
        let layout = PageLayout {
            page_size: PageSizePolicy::Fixed(PaperSize::Custom {
                width_mm: 0,
                height_mm: 0,
            }),
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
        };
        let g = PageGeometry::compute(&layout, 640, 480);
        assert!(close(g.page_width, MIN_PAGE_PT));
        assert_drawable(&g);
    }

    #[test]
    fn oversized_paper_is_capped() {
        let layout = PageLayout {
            page_size: PageSizePolicy::Fixed(PaperSize::Custom {
                width_mm: 20_000,
                height_mm: 20_000,
            }),
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
        };
        let g = PageGeometry::compute(&layout, 100, 100);
        assert!(close(g.page_width, MAX_PAGE_PT));
        assert!(close(g.page_height, MAX_PAGE_PT));
        assert_drawable(&g);
    }

    #[test]
    fn huge_dpi_still_gives_a_visible_page() {
        let layout = PageLayout {
            page_size: PageSizePolicy::ImageNative { dpi: 1_000_000_000 },
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
        };
        let g = PageGeometry::compute(&layout, 400, 200);
        assert_drawable(&g);
        assert!(close(g.image_width / g.image_height, 2.0));
        assert!(close(g.page_height, MIN_PAGE_PT));
    }

    #[test]
    fn extreme_aspect_ratio_keeps_a_positive_draw_size() {
        let g = PageGeometry::compute(&fixed(PageOrientation::Portrait, 0.0), 1, 1_000_000);
        assert_drawable(&g);

        let layout = PageLayout {
            page_size: PageSizePolicy::ImageNative { dpi: 72 },
            orientation: PageOrientation::Portrait,
            margin_mm: 0.0,
        };
        assert_drawable(&PageGeometry::compute(&layout, 1_000_000, 1));
    }
}
