// Session - The editing and playback surface a host UI drives
// Owns the project document, the transport and the undo history
use thiserror::Error;
use uuid::Uuid;

use crate::arranger::{resolve_active, ArrangementError, StackSettings};
use crate::bridge::{export_pattern_midi, notes_to_rows, rows_to_notes, MidiError, MidiExportOptions, MidiNote};
use crate::pattern::{BaseLength, Instrument, RowKind, Subdivision};
use crate::state::{EditHistory, LibraryError, LoadError, RhythmData};
use crate::transport::{AudioSync, FrameInput, LoopRegion, Transport};
use crate::visual::{compose_layers, LayerFrame};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Arrangement(#[from] ArrangementError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Midi(#[from] MidiError),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone)]
pub struct Session {
    data: RhythmData,
    transport: Transport,
    history: EditHistory,
    sync: AudioSync,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(RhythmData::default())
    }
}

impl Session {
    pub fn new(mut data: RhythmData) -> Self {
        let mut transport = Transport::new(data.playback.bpm);
        transport.set_loop_region(data.playback.loop_region);
        data.playback.bpm = transport.bpm();
        let sync = AudioSync::new(data.playback.sync_offset);
        Session {
            data,
            transport,
            history: EditHistory::new(),
            sync,
        }
    }

    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(Session::new(RhythmData::from_json(json)?))
    }

    pub fn to_json(&self) -> SessionResult<String> {
        Ok(self.data.to_json()?)
    }

    pub fn data(&self) -> &RhythmData {
        &self.data
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    // ==================== FRAME ====================

    /// Advance the clock by one frame and compute that frame
    pub fn tick(&mut self, frame_delta: f64) -> Vec<LayerFrame> {
        self.transport.advance(frame_delta);
        self.frame()
    }

    pub fn frame_input(&self) -> FrameInput {
        let arrangement = &self.data.arrangement;
        self.transport
            .frame_input(arrangement.length_bars(), arrangement.is_active())
    }

    /// Layers at the current position, without advancing
    pub fn frame(&self) -> Vec<LayerFrame> {
        let input = self.frame_input();
        let library = &self.data.library;
        let layers = resolve_active(
            input.effective_bar,
            &self.data.arrangement,
            library.patterns(),
            &self.data.stacks,
            Some(library.current_id()),
            library.live(),
        );
        compose_layers(&input, &layers, &self.data.visual, &self.data.synth)
    }

    /// Playhead as a fraction of the arrangement
    pub fn playhead(&self) -> f64 {
        self.transport
            .playhead_fraction(self.data.arrangement.length_bars())
    }

    // ==================== TRANSPORT ====================

    pub fn set_bpm(&mut self, bpm: f64) {
        self.transport.set_bpm(bpm);
        self.data.playback.bpm = self.transport.bpm();
    }

    pub fn set_loop_region(&mut self, region: LoopRegion) {
        self.transport.set_loop_region(region);
        self.data.playback.loop_region = region;
    }

    pub fn set_sync_offset(&mut self, sync_offset: f64) {
        self.sync = AudioSync::new(sync_offset);
        self.data.playback.sync_offset = sync_offset;
    }

    /// Time the audio element should be at for the current position
    pub fn audio_time(&self) -> f64 {
        self.sync.audio_time_for(self.transport.elapsed_seconds())
    }

    /// Snap the engine to the audio clock when it drifted beyond `tolerance`
    /// seconds. Returns true if the position changed.
    pub fn resync_to_audio(&mut self, audio_time: f64, tolerance: f64) -> bool {
        let elapsed = self.transport.elapsed_seconds();
        if !self.sync.needs_resync(elapsed, audio_time, tolerance) {
            return false;
        }
        let target = self.sync.elapsed_for_audio_time(audio_time);
        log::debug!("Resyncing to audio: {:.3}s -> {:.3}s", elapsed, target);
        self.transport
            .seek_bar(crate::transport::seconds_to_bar(target, self.transport.bpm()));
        true
    }

    // ==================== HISTORY ====================

    fn checkpoint(&mut self) {
        self.history.checkpoint(&self.data);
    }

    /// Tempo, loop and sync offset are not edit steps; a restore keeps the current ones
    pub fn undo(&mut self) -> bool {
        let playback = self.data.playback;
        let undone = self.history.undo(&mut self.data);
        self.data.playback = playback;
        undone
    }

    pub fn redo(&mut self) -> bool {
        let playback = self.data.playback;
        let redone = self.history.redo(&mut self.data);
        self.data.playback = playback;
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== PATTERN EDITING ====================

    pub fn toggle_cell(&mut self, kind: RowKind, index: usize) {
        self.checkpoint();
        self.data.library.live_mut().rows.row_mut(kind).toggle_cell(index);
    }

    pub fn clear_row(&mut self, kind: RowKind) {
        self.checkpoint();
        self.data.library.live_mut().rows.row_mut(kind).clear();
    }

    pub fn set_base_length(&mut self, kind: RowKind, base_length: BaseLength) {
        self.checkpoint();
        self.data
            .library
            .live_mut()
            .rows
            .row_mut(kind)
            .set_base_length(base_length);
    }

    pub fn set_subdivision(&mut self, kind: RowKind, subdivision: Subdivision) {
        self.checkpoint();
        self.data
            .library
            .live_mut()
            .rows
            .row_mut(kind)
            .set_subdivision(subdivision);
    }

    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.checkpoint();
        self.data.library.live_mut().instrument = instrument;
    }

    /// Piano-roll view of the open pattern
    pub fn live_notes(&self) -> Vec<MidiNote> {
        rows_to_notes(&self.data.library.live().rows, crate::bridge::DEFAULT_VELOCITY)
    }

    /// Replace the open pattern's cells with piano-roll notes
    pub fn apply_notes(&mut self, notes: &[MidiNote]) {
        self.checkpoint();
        let live = self.data.library.live_mut();
        live.rows = notes_to_rows(notes, &live.rows);
    }

    pub fn export_live_midi(&self, options: &MidiExportOptions) -> SessionResult<Vec<u8>> {
        Ok(export_pattern_midi(
            self.data.library.live(),
            self.transport.bpm(),
            options,
        )?)
    }

    // ==================== PATTERN LIBRARY ====================

    pub fn new_pattern(&mut self, name: &str) -> Uuid {
        self.checkpoint();
        self.data.library.new_pattern(name)
    }

    pub fn duplicate_pattern(&mut self, id: Uuid) -> SessionResult<Uuid> {
        self.checkpoint();
        Ok(self.data.library.duplicate(id)?)
    }

    pub fn delete_pattern(&mut self, id: Uuid) -> SessionResult<usize> {
        self.checkpoint();
        let RhythmData {
            library,
            arrangement,
            ..
        } = &mut self.data;
        Ok(library.delete(id, arrangement)?)
    }

    pub fn switch_pattern(&mut self, id: Uuid) -> SessionResult<()> {
        if !self.data.library.contains(id) {
            return Err(LibraryError::UnknownPattern(id).into());
        }
        self.checkpoint();
        Ok(self.data.library.switch_to(id)?)
    }

    pub fn rename_pattern(&mut self, id: Uuid, name: &str) -> SessionResult<()> {
        self.checkpoint();
        Ok(self.data.library.rename(id, name)?)
    }

    // ==================== ARRANGEMENT ====================

    /// Add a pattern to the timeline at its own length in bars
    pub fn add_clip(&mut self, pattern_id: Uuid, start_bar: f64, stack: u32) -> SessionResult<Uuid> {
        let library = &self.data.library;
        let bars = if pattern_id == library.current_id() {
            library.live().bars
        } else {
            library
                .get(pattern_id)
                .ok_or(LibraryError::UnknownPattern(pattern_id))?
                .bars
        };
        self.checkpoint();
        Ok(self
            .data
            .arrangement
            .add_clip(pattern_id, start_bar, bars.max(1) as f64, stack)?)
    }

    pub fn move_clip(&mut self, clip_id: Uuid, start_bar: f64, stack: u32) -> SessionResult<()> {
        self.checkpoint();
        Ok(self.data.arrangement.move_clip(clip_id, start_bar, stack)?)
    }

    pub fn duplicate_clip(&mut self, clip_id: Uuid) -> SessionResult<Uuid> {
        self.checkpoint();
        Ok(self.data.arrangement.duplicate_clip(clip_id)?)
    }

    pub fn remove_clip(&mut self, clip_id: Uuid) -> SessionResult<()> {
        self.checkpoint();
        self.data.arrangement.remove_clip(clip_id)?;
        Ok(())
    }

    pub fn set_arrangement_enabled(&mut self, enabled: bool) {
        self.checkpoint();
        self.data.arrangement.enabled = enabled;
    }

    pub fn set_stack_settings(&mut self, stack: u32, settings: StackSettings) {
        self.checkpoint();
        self.data.stacks.set(stack, settings);
    }
}
