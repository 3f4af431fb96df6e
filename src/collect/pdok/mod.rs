pub mod pdok_collect;
