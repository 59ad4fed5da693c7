pub mod social_golfer;
