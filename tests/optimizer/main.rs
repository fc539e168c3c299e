mod archive;
mod events;
mod termination;
