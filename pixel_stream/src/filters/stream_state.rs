use crate::error::*;
use crate::geometry::*;
use crate::stream::*;

///
/// Where a filter is in the sequence of calls that make up a production
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StreamPhase {
    /// Waiting for the dimensions of an image
    Idle,

    /// The dimensions are known but no pixels have arrived yet
    Dimensioned,

    /// Pixels are being received
    Receiving,

    /// The image has been completed
    Complete,
}

///
/// Tracks the state of the stream arriving at a filter, and checks that the producer is following the protocol
///
/// Producers must send the dimensions of an image before its pixels. An image with no pixels (a width or height of 0 or
/// less) is finished immediately: the filter sends `ImageDone` downstream and any completion the producer sends later
/// is not passed on.
///
#[derive(Clone, Debug)]
pub struct StreamState {
    phase:              StreamPhase,
    width:              i32,
    height:             i32,

    /// Set once the downstream consumer has been sent `ImageDone` on behalf of the producer
    downstream_done:    bool,
}

impl Default for StreamState {
    fn default() -> Self {
        StreamState::new()
    }
}

impl StreamState {
    ///
    /// Creates a stream state waiting for the dimensions of an image
    ///
    pub fn new() -> StreamState {
        StreamState {
            phase:              StreamPhase::Idle,
            width:              0,
            height:             0,
            downstream_done:    false,
        }
    }

    #[inline] pub fn phase(&self) -> StreamPhase { self.phase }
    #[inline] pub fn dimensions(&self) -> (i32, i32) { (self.width, self.height) }

    ///
    /// The region that pixels will be clipped against
    ///
    #[inline]
    pub fn bounds(&self) -> Rectangle {
        Rectangle::with_size(self.width, self.height)
    }

    ///
    /// Starts a new image. Returns false if the image is empty, in which case the caller should send `ImageDone` to its
    /// consumer and nothing else
    ///
    pub fn set_dimensions(&mut self, width: i32, height: i32) -> bool {
        self.width              = width;
        self.height             = height;

        if width <= 0 || height <= 0 {
            self.phase              = StreamPhase::Complete;
            self.downstream_done    = true;
            false
        } else {
            self.phase              = StreamPhase::Dimensioned;
            self.downstream_done    = false;
            true
        }
    }

    ///
    /// Indicates that the downstream consumer has been finished early (for example, because a crop region is empty)
    ///
    /// Pixels are still accepted from the producer, but are all dropped, as are any later completions.
    ///
    pub fn finish_downstream(&mut self) {
        self.downstream_done = true;
    }

    ///
    /// Checks that a block of pixels can be received, and clips it to the bounds of the image
    ///
    /// Returns `None` if the block doesn't contain any pixels that should be passed on.
    ///
    pub fn accept_block<'a>(&mut self, block: &PixelBlock<'a>) -> Result<Option<PixelBlock<'a>>> {
        match self.phase {
            StreamPhase::Dimensioned | StreamPhase::Receiving => { }

            StreamPhase::Idle       => { return Err(PixelStreamError::delivery("pixels were sent before the image dimensions")); }
            StreamPhase::Complete   => { return Err(PixelStreamError::delivery("pixels were sent after the image was completed")); }
        }

        let clipped = block.clipped_to(&self.bounds())?;
        self.phase  = StreamPhase::Receiving;

        if self.downstream_done {
            Ok(None)
        } else {
            Ok(clipped)
        }
    }

    ///
    /// Updates the state for a completion status. Returns true if the status should be sent on to the consumer
    ///
    pub fn complete(&mut self, status: CompletionStatus) -> bool {
        let forward = !self.downstream_done;

        match status {
            CompletionStatus::Error | CompletionStatus::Aborted => {
                self.phase  = StreamPhase::Idle;
                self.width  = 0;
                self.height = 0;
            }

            CompletionStatus::FrameDone => {
                if self.phase != StreamPhase::Complete {
                    self.phase = StreamPhase::Receiving;
                }
            }

            CompletionStatus::ImageDone => {
                self.phase = StreamPhase::Complete;
            }
        }

        forward
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pixels_need_dimensions() {
        let color       = crate::color::ColorInterpreter::default_argb();
        let pixels      = vec![0u32; 4];
        let block       = PixelBlock::from_ints(0, 0, 2, 2, &color, &pixels);
        let mut state   = StreamState::new();

        assert!(state.accept_block(&block).is_err());

        state.set_dimensions(2, 2);
        assert!(state.accept_block(&block).unwrap().is_some());
        assert!(state.phase() == StreamPhase::Receiving);
    }

    #[test]
    fn null_image_swallows_later_completion() {
        let mut state = StreamState::new();

        assert!(!state.set_dimensions(0, 10));
        assert!(state.phase() == StreamPhase::Complete);
        assert!(!state.complete(CompletionStatus::ImageDone));

        assert!(state.set_dimensions(3, 3));
        assert!(state.complete(CompletionStatus::ImageDone));
    }

    #[test]
    fn errors_return_to_idle() {
        let mut state = StreamState::new();

        state.set_dimensions(5, 5);
        assert!(state.complete(CompletionStatus::Aborted));
        assert!(state.phase() == StreamPhase::Idle);
        assert!(state.dimensions() == (0, 0));
    }

    #[test]
    fn frames_keep_dimensions() {
        let mut state = StreamState::new();

        state.set_dimensions(5, 4);
        assert!(state.complete(CompletionStatus::FrameDone));
        assert!(state.phase() == StreamPhase::Receiving);
        assert!(state.dimensions() == (5, 4));
    }
}
