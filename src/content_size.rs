//! Scrollable content-extent computation for container elements
//!
//! Table and collection views only report their visible bounding box through
//! the normal size/location queries; scrolling logic needs the total logical
//! content height. This module derives it from the raw child frames the
//! bridge reports, with no I/O and no state.

use serde::{Deserialize, Serialize};

/// Screen-space position of an element's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Width and height of an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned rectangle for one child element, as reported by
/// `childElementsFrames()`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point,
    pub size: Dimensions,
}

/// Container classification used to pick the extent algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `UIATableView`: one cell per row, rows stacked vertically
    Table,
    /// `UIACollectionView`: uniform cells in a row/column grid
    Collection,
    /// Anything else; no content-size semantics defined
    Unsupported,
}

impl ContainerKind {
    pub fn from_class_name(name: &str) -> Self {
        match name {
            "UIATableView" => ContainerKind::Table,
            "UIACollectionView" => ContainerKind::Collection,
            _ => ContainerKind::Unsupported,
        }
    }
}

/// Content-size descriptor returned for the `contentSize` attribute.
///
/// `width`/`height`/`top`/`left` are the container's own visible bounding
/// box; `scrollable_offset` is the total scrollable extent along the vertical
/// axis and may exceed `height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
    #[serde(rename = "scrollableOffset")]
    pub scrollable_offset: f64,
}

/// Compute a container's content size from its child frames.
///
/// Returns `None` for unsupported container kinds. Children are assumed to
/// arrive in the toolkit's natural top-to-bottom, left-to-right order and to
/// enumerate every row, not just the visible ones; a caller that only
/// supplies visible rows gets an under-counted extent.
///
/// For collections, every row is assumed to hold as many cells as the first
/// row and all cells are assumed uniform in size. Violations produce a wrong
/// extent, not an error.
pub fn compute_content_size(
    kind: ContainerKind,
    frames: &[Frame],
    own_size: Dimensions,
    own_origin: Point,
) -> Option<ContentSize> {
    let scrollable_offset = match kind {
        ContainerKind::Unsupported => return None,
        _ if frames.is_empty() => 0.0,
        ContainerKind::Table => {
            let first = &frames[0];
            let last = &frames[frames.len() - 1];
            last.origin.y + last.size.height - first.origin.y
        }
        ContainerKind::Collection => {
            let first = frames[0];

            // Cells per row: index of the first frame that starts a new row.
            // A single-row collection never changes y, so the whole list is
            // one row.
            let elements_in_row = frames
                .iter()
                .position(|frame| frame.origin.y != first.origin.y)
                .unwrap_or(frames.len());

            let space_between_rows = if elements_in_row < frames.len() {
                let row2_first = &frames[elements_in_row];
                let row1_last = &frames[elements_in_row - 1];
                row2_first.origin.y - row1_last.origin.y - row1_last.size.height
            } else {
                0.0
            };

            let number_of_rows = (frames.len() as f64 / elements_in_row as f64).ceil();

            number_of_rows * first.size.height + space_between_rows * (number_of_rows - 1.0)
        }
    };

    Some(ContentSize {
        width: own_size.width,
        height: own_size.height,
        top: own_origin.y,
        left: own_origin.x,
        scrollable_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f64, y: f64, width: f64, height: f64) -> Frame {
        Frame {
            origin: Point { x, y },
            size: Dimensions { width, height },
        }
    }

    fn two_by_three_grid() -> Vec<Frame> {
        vec![
            frame(0.0, 44.0, 100.0, 500.0),
            frame(110.0, 44.0, 100.0, 500.0),
            frame(220.0, 44.0, 100.0, 500.0),
            frame(0.0, 554.0, 100.0, 500.0),
            frame(110.0, 554.0, 100.0, 500.0),
            frame(220.0, 554.0, 100.0, 500.0),
        ]
    }

    #[test]
    fn test_unsupported_kind_returns_none() {
        let frames = vec![frame(0.0, 0.0, 320.0, 1000.0)];
        let result = compute_content_size(
            ContainerKind::Unsupported,
            &frames,
            Dimensions {
                width: 320.0,
                height: 548.0,
            },
            Point { x: 0.0, y: 20.0 },
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_table_view_extent() {
        let frames = vec![
            frame(0.0, 0.0, 320.0, 1000.0),
            frame(0.0, 1000.0, 320.0, 1000.0),
        ];
        let result = compute_content_size(
            ContainerKind::Table,
            &frames,
            Dimensions {
                width: 320.0,
                height: 548.0,
            },
            Point { x: 0.0, y: 20.0 },
        )
        .unwrap();
        assert_eq!(result.left, 0.0);
        assert_eq!(result.top, 20.0);
        assert_eq!(result.width, 320.0);
        assert_eq!(result.height, 548.0);
        assert_eq!(result.scrollable_offset, 2000.0);
    }

    #[test]
    fn test_collection_view_extent() {
        let result = compute_content_size(
            ContainerKind::Collection,
            &two_by_three_grid(),
            Dimensions {
                width: 320.0,
                height: 524.0,
            },
            Point { x: 0.0, y: 44.0 },
        )
        .unwrap();
        assert_eq!(result.left, 0.0);
        assert_eq!(result.top, 44.0);
        assert_eq!(result.width, 320.0);
        assert_eq!(result.height, 524.0);
        // 2 rows * 500 + 10px gap between rows
        assert_eq!(result.scrollable_offset, 1010.0);
    }

    #[test]
    fn test_single_row_collection_does_not_divide_by_zero() {
        let frames = vec![
            frame(0.0, 44.0, 100.0, 500.0),
            frame(110.0, 44.0, 100.0, 500.0),
            frame(220.0, 44.0, 100.0, 500.0),
        ];
        let result = compute_content_size(
            ContainerKind::Collection,
            &frames,
            Dimensions {
                width: 320.0,
                height: 524.0,
            },
            Point { x: 0.0, y: 44.0 },
        )
        .unwrap();
        // one row, no vertical repetition
        assert_eq!(result.scrollable_offset, 500.0);
    }

    #[test]
    fn test_empty_frames_give_zero_offset() {
        for kind in [ContainerKind::Table, ContainerKind::Collection] {
            let result = compute_content_size(
                kind,
                &[],
                Dimensions {
                    width: 320.0,
                    height: 548.0,
                },
                Point { x: 0.0, y: 0.0 },
            )
            .unwrap();
            assert_eq!(result.scrollable_offset, 0.0);
            assert_eq!(result.width, 320.0);
        }
    }

    #[test]
    fn test_pure_and_deterministic() {
        let frames = two_by_three_grid();
        let size = Dimensions {
            width: 320.0,
            height: 524.0,
        };
        let origin = Point { x: 0.0, y: 44.0 };
        let first = compute_content_size(ContainerKind::Collection, &frames, size, origin);
        let second = compute_content_size(ContainerKind::Collection, &frames, size, origin);
        assert_eq!(first, second);
    }

    #[test]
    fn test_class_name_mapping() {
        assert_eq!(
            ContainerKind::from_class_name("UIATableView"),
            ContainerKind::Table
        );
        assert_eq!(
            ContainerKind::from_class_name("UIACollectionView"),
            ContainerKind::Collection
        );
        assert_eq!(
            ContainerKind::from_class_name("UIAButton"),
            ContainerKind::Unsupported
        );
    }
}
