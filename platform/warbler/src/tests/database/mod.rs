mod like;
