//! Time marks: the thresholds at which a presentation advances to the next slide.

use std::time::Duration;

/// Ordered slide thresholds in milliseconds from playback start
///
/// N marks describe N+1 slides. Slide 0 is shown from time zero until the
/// first mark, slide `i` from mark `i-1` until mark `i`, and the last slide
/// has no upper bound.
///
/// Marks must be strictly ascending. This is a precondition and is not
/// checked at runtime; out-of-order marks give clamped but otherwise
/// unspecified results. Use [`TimeMarks::is_strictly_ascending`] to report
/// malformed input before building a presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeMarks {
    marks: Vec<u64>,
}

impl TimeMarks {
    /// Creates a set of time marks from millisecond thresholds
    ///
    /// # Examples
    ///
    /// ```
    /// use slidecast_clock::TimeMarks;
    ///
    /// let marks = TimeMarks::new(vec![1000, 3000, 6000]);
    /// assert_eq!(marks.slide_count(), 4);
    /// ```
    pub fn new(marks: Vec<u64>) -> Self {
        Self { marks }
    }

    /// Number of slides these marks describe (always at least one)
    pub fn slide_count(&self) -> usize {
        self.marks.len() + 1
    }

    /// Index of the last slide
    pub fn last_slide(&self) -> usize {
        self.marks.len()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Whether every mark is strictly greater than the one before it
    pub fn is_strictly_ascending(&self) -> bool {
        self.marks.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Selects the slide shown after `elapsed` milliseconds of playback
    ///
    /// The result is the number of marks less than or equal to `elapsed`,
    /// which is the unique `i` with `marks[i-1] <= elapsed < marks[i]`.
    /// Past the last mark the final slide is held.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidecast_clock::TimeMarks;
    ///
    /// let marks = TimeMarks::new(vec![1000, 3000, 6000]);
    /// assert_eq!(marks.slide_at(500), 0);
    /// assert_eq!(marks.slide_at(3000), 2);
    /// assert_eq!(marks.slide_at(9000), 3);
    /// ```
    pub fn slide_at(&self, elapsed_ms: u64) -> usize {
        self.marks.partition_point(|&mark| mark <= elapsed_ms)
    }

    /// Same as [`TimeMarks::slide_at`] for a [`Duration`]
    pub fn slide_for(&self, elapsed: Duration) -> usize {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.slide_at(elapsed_ms)
    }

    /// Time at which `slide` becomes visible, if the slide exists
    pub fn slide_start(&self, slide: usize) -> Option<u64> {
        match slide {
            0 => Some(0),
            i => self.marks.get(i - 1).copied(),
        }
    }
}

impl From<Vec<u64>> for TimeMarks {
    fn from(marks: Vec<u64>) -> Self {
        Self::new(marks)
    }
}
